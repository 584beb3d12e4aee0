//! In-process store implementing every store trait.
//!
//! Thread-safe via interior `RwLock`s; wrap in `Arc` and share it between
//! the service and whatever seeds it.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use pagecraft_core::brandkit::{ensure_deletable, validate_brandkit, Brandkit};
use pagecraft_core::content_resolution::ContentMap;
use pagecraft_core::content_value::{validate_content_record, ContentRecord};
use pagecraft_core::error::CoreError;
use pagecraft_core::section::{sort_sections, Section};
use pagecraft_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::ServiceResult;
use crate::store::{BrandkitSource, ContentSource, SectionSource};

#[derive(Default)]
pub struct InMemoryStore {
    content: RwLock<HashMap<DbId, Vec<ContentRecord>>>,
    brandkits: RwLock<BTreeMap<DbId, Brandkit>>,
    sections: RwLock<HashMap<DbId, Vec<Section>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record with the same `(key, languageId)` on a page.
    pub async fn put_content(&self, page_id: DbId, record: ContentRecord) -> ServiceResult<()> {
        validate_content_record(&record)?;
        let mut content = self.content.write().await;
        let records = content.entry(page_id).or_default();
        match records
            .iter_mut()
            .find(|r| r.key == record.key && r.language_id == record.language_id)
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    pub async fn put_sections(&self, page_id: DbId, sections: Vec<Section>) {
        self.sections.write().await.insert(page_id, sections);
    }

    /// Insert or update a brandkit.
    ///
    /// Updates bump `version`. Saving a brandkit flagged default clears the
    /// flag on every other brandkit under the same lock.
    pub async fn put_brandkit(&self, mut brandkit: Brandkit) -> ServiceResult<Brandkit> {
        validate_brandkit(&brandkit)?;
        let now = Utc::now();
        let mut brandkits = self.brandkits.write().await;

        match brandkits.get(&brandkit.id) {
            Some(existing) => {
                brandkit.version = existing.version + 1;
                brandkit.created_at = existing.created_at;
            }
            None => {
                brandkit.created_at = brandkit.created_at.or(Some(now));
            }
        }
        brandkit.updated_at = Some(now);

        if brandkit.is_default {
            for other in brandkits.values_mut().filter(|b| b.id != brandkit.id) {
                other.is_default = false;
            }
        }
        brandkits.insert(brandkit.id, brandkit.clone());
        Ok(brandkit)
    }

    /// Make `id` the single default brandkit.
    ///
    /// Unsetting the previous default and setting the new one happen under
    /// one write lock, so readers never observe zero or two defaults.
    pub async fn set_default_brandkit(&self, id: DbId) -> ServiceResult<Brandkit> {
        let mut brandkits = self.brandkits.write().await;
        let target = brandkits.get(&id).ok_or(CoreError::NotFound {
            entity: "Brandkit",
            id,
        })?;
        if !target.is_active {
            return Err(CoreError::Validation(format!(
                "Brandkit '{}' is inactive and cannot be the default",
                target.name
            ))
            .into());
        }

        let now = Utc::now();
        for brandkit in brandkits.values_mut() {
            let is_target = brandkit.id == id;
            if brandkit.is_default != is_target {
                brandkit.is_default = is_target;
                brandkit.updated_at = Some(now);
            }
        }

        let updated = brandkits[&id].clone();
        tracing::info!(brandkit_id = id, name = %updated.name, "Default brandkit changed");
        Ok(updated)
    }

    /// Delete a brandkit. The default brandkit cannot be deleted.
    pub async fn delete_brandkit(&self, id: DbId) -> ServiceResult<()> {
        let mut brandkits = self.brandkits.write().await;
        let brandkit = brandkits.get(&id).ok_or(CoreError::NotFound {
            entity: "Brandkit",
            id,
        })?;
        ensure_deletable(brandkit)?;
        brandkits.remove(&id);
        Ok(())
    }

    /// All brandkits ordered by id.
    pub async fn list_brandkits(&self) -> Vec<Brandkit> {
        self.brandkits.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ContentSource for InMemoryStore {
    async fn content_for(&self, page_id: DbId, language_id: &str) -> ServiceResult<ContentMap> {
        let content = self.content.read().await;
        Ok(content
            .get(&page_id)
            .map(|records| ContentMap::from_records(records, language_id))
            .unwrap_or_default())
    }
}

#[async_trait]
impl BrandkitSource for InMemoryStore {
    async fn find_brandkit(&self, id: DbId) -> ServiceResult<Option<Brandkit>> {
        Ok(self.brandkits.read().await.get(&id).cloned())
    }

    async fn default_brandkit(&self) -> ServiceResult<Option<Brandkit>> {
        Ok(self
            .brandkits
            .read()
            .await
            .values()
            .find(|b| b.is_default)
            .cloned())
    }
}

#[async_trait]
impl SectionSource for InMemoryStore {
    async fn sections_for(&self, page_id: DbId) -> ServiceResult<Vec<Section>> {
        let mut sections = self
            .sections
            .read()
            .await
            .get(&page_id)
            .cloned()
            .unwrap_or_default();
        sort_sections(&mut sections);
        Ok(sections)
    }

    async fn save_sections(&self, page_id: DbId, sections: &[Section]) -> ServiceResult<()> {
        self.sections
            .write()
            .await
            .insert(page_id, sections.to_vec());
        Ok(())
    }
}
