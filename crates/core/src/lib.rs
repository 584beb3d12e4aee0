//! Pagecraft content & brand resolution engine.
//!
//! Everything in this crate is a pure, in-memory computation:
//!
//! - [`content_value`] and [`content_resolution`] turn stored content
//!   records into typed display values through the stored → prop → default
//!   fallback chain.
//! - [`brandkit`], [`style_settings`] and [`section`] model design tokens and
//!   the per-section style tree.
//! - [`brandkit_apply`] merges brandkit tokens into sections under a
//!   conflict-resolution policy; [`compatibility`] reports what an
//!   application would destroy before it is committed.
//!
//! Loading inputs and persisting outputs is left to the caller.

pub mod brandkit;
pub mod brandkit_apply;
pub mod compatibility;
pub mod content_resolution;
pub mod content_value;
pub mod error;
pub mod section;
pub mod style_settings;
pub mod types;
