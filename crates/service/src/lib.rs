//! Collaborator layer around the pagecraft engine.
//!
//! [`pagecraft_core`] is pure; this crate loads its inputs and persists its
//! outputs:
//!
//! - [`store`]: async traits for the content, brandkit and section stores.
//! - [`memory`]: an in-process store implementing all three, including the
//!   single-default-brandkit transaction.
//! - [`service::EngineService`]: loads a page, runs resolution or brandkit
//!   application, logs engine warnings and persists unless dry-run.
//! - [`config::EngineConfig`]: environment-driven defaults.

pub mod config;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;

pub use config::EngineConfig;
pub use error::{ServiceError, ServiceResult};
pub use memory::InMemoryStore;
pub use service::EngineService;
