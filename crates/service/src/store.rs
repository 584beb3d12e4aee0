//! Store traits the engine's collaborators implement.
//!
//! The engine never talks to storage itself; [`EngineService`](crate::EngineService)
//! reads through these traits and writes back only non-dry-run results.

use async_trait::async_trait;
use pagecraft_core::brandkit::Brandkit;
use pagecraft_core::content_resolution::ContentMap;
use pagecraft_core::section::Section;
use pagecraft_core::types::DbId;

use crate::error::ServiceResult;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Stored content for one page translation. Unknown pages yield an empty map.
    async fn content_for(&self, page_id: DbId, language_id: &str) -> ServiceResult<ContentMap>;
}

#[async_trait]
pub trait BrandkitSource: Send + Sync {
    async fn find_brandkit(&self, id: DbId) -> ServiceResult<Option<Brandkit>>;

    /// The brandkit currently flagged as default, if any.
    async fn default_brandkit(&self) -> ServiceResult<Option<Brandkit>>;
}

#[async_trait]
pub trait SectionSource: Send + Sync {
    /// A page's sections, sorted by `order`.
    async fn sections_for(&self, page_id: DbId) -> ServiceResult<Vec<Section>>;

    /// Replace a page's sections with the given list.
    async fn save_sections(&self, page_id: DbId, sections: &[Section]) -> ServiceResult<()>;
}
