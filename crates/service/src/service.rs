//! Orchestration between the stores and the pure engine.

use std::sync::Arc;

use pagecraft_core::brandkit::Brandkit;
use pagecraft_core::brandkit_apply::{
    apply_brandkit, preview_brandkit_report, ApplicationOptions, ApplicationResult, PreviewReport,
};
use pagecraft_core::compatibility::{
    validate_compatibility, validate_compatibility_for, CompatibilityReport,
};
use pagecraft_core::content_resolution::{resolve_with_source, ContentMap, Resolvable};
use pagecraft_core::error::CoreError;
use pagecraft_core::section::Section;
use pagecraft_core::types::DbId;

use crate::config::EngineConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::store::{BrandkitSource, ContentSource, SectionSource};

pub struct EngineService {
    content: Arc<dyn ContentSource>,
    brandkits: Arc<dyn BrandkitSource>,
    sections: Arc<dyn SectionSource>,
    config: EngineConfig,
}

impl EngineService {
    pub fn new(
        content: Arc<dyn ContentSource>,
        brandkits: Arc<dyn BrandkitSource>,
        sections: Arc<dyn SectionSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            content,
            brandkits,
            sections,
            config,
        }
    }

    /// Build a service backed by one store that implements every trait.
    pub fn with_store<S>(store: Arc<S>, config: EngineConfig) -> Self
    where
        S: ContentSource + BrandkitSource + SectionSource + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /* ----------------------------------------------------------------------
       Content
       ---------------------------------------------------------------------- */

    /// Stored content for a page, in `language_id` or the configured default.
    pub async fn page_content(
        &self,
        page_id: DbId,
        language_id: Option<&str>,
    ) -> ServiceResult<ContentMap> {
        let language_id = language_id.unwrap_or(&self.config.default_language);
        self.content.content_for(page_id, language_id).await
    }

    /// Resolve one key through the stored, prop, default chain.
    pub fn resolve<T: Resolvable>(
        &self,
        content: &ContentMap,
        key: &str,
        prop: Option<T>,
        default: T,
    ) -> T {
        let (value, source) = resolve_with_source(key, content, prop, default);
        tracing::debug!(key, ?source, "Resolved content key");
        value
    }

    pub fn resolve_text(
        &self,
        content: &ContentMap,
        key: &str,
        prop: Option<&str>,
        default: &str,
    ) -> String {
        self.resolve(
            content,
            key,
            prop.map(str::to_string),
            default.to_string(),
        )
    }

    /* ----------------------------------------------------------------------
       Brandkits
       ---------------------------------------------------------------------- */

    /// Load the named brandkit, or the default one when `brandkit_id` is `None`.
    pub async fn load_brandkit(&self, brandkit_id: Option<DbId>) -> ServiceResult<Brandkit> {
        match brandkit_id {
            Some(id) => self
                .brandkits
                .find_brandkit(id)
                .await?
                .ok_or_else(|| {
                    CoreError::NotFound {
                        entity: "Brandkit",
                        id,
                    }
                    .into()
                }),
            None => self
                .brandkits
                .default_brandkit()
                .await?
                .ok_or(ServiceError::NoDefaultBrandkit),
        }
    }

    /// Apply a brandkit to a page and persist the result unless `dry_run`.
    ///
    /// `options` defaults to [`EngineConfig::default_options`].
    pub async fn apply(
        &self,
        page_id: DbId,
        brandkit_id: Option<DbId>,
        options: Option<ApplicationOptions>,
    ) -> ServiceResult<ApplicationResult> {
        let options = options.unwrap_or_else(|| self.config.default_options());
        let sections = self.load_sections(page_id, &options).await?;
        let brandkit = self.load_brandkit(brandkit_id).await?;

        let application = apply_brandkit(&sections, &brandkit, &options);
        for warning in &application.result.warnings {
            tracing::warn!(
                page_id,
                brandkit_id = brandkit.id,
                %warning,
                "Brandkit application warning"
            );
        }

        let changed = application.result.changed_field_count();
        if !options.dry_run && changed > 0 {
            self.sections
                .save_sections(page_id, &application.sections)
                .await?;
            tracing::info!(
                page_id,
                brandkit_id = brandkit.id,
                sections = application.result.changed_sections.len(),
                fields = changed,
                policy = %options.conflict_resolution,
                "Brandkit applied"
            );
        } else {
            tracing::debug!(
                page_id,
                brandkit_id = brandkit.id,
                dry_run = options.dry_run,
                fields = changed,
                "Brandkit application not persisted"
            );
        }

        Ok(application.result)
    }

    /// Dry-run report of what [`apply`](Self::apply) would do. Never persists.
    pub async fn preview(
        &self,
        page_id: DbId,
        brandkit_id: Option<DbId>,
        options: Option<ApplicationOptions>,
    ) -> ServiceResult<PreviewReport> {
        let options = options.unwrap_or_else(|| self.config.default_options());
        let sections = self.load_sections(page_id, &options).await?;
        let brandkit = self.load_brandkit(brandkit_id).await?;
        Ok(preview_brandkit_report(&sections, &brandkit, &options))
    }

    /// Compatibility check for a page.
    ///
    /// Without `intended` options the most destructive application is assumed.
    pub async fn validate(
        &self,
        page_id: DbId,
        brandkit_id: Option<DbId>,
        intended: Option<ApplicationOptions>,
    ) -> ServiceResult<CompatibilityReport> {
        let scope = intended.clone().unwrap_or_default();
        let sections = self.load_sections(page_id, &scope).await?;
        let brandkit = self.load_brandkit(brandkit_id).await?;

        let report = match intended {
            Some(options) => validate_compatibility_for(&sections, &brandkit, &options),
            None => validate_compatibility(&sections, &brandkit),
        };
        if !report.compatible {
            tracing::debug!(
                page_id,
                brandkit_id = brandkit.id,
                issues = report.issues.len(),
                "Brandkit incompatible with page"
            );
        }
        Ok(report)
    }

    /// Load a page's sections and enforce the per-application section limit.
    async fn load_sections(
        &self,
        page_id: DbId,
        options: &ApplicationOptions,
    ) -> ServiceResult<Vec<Section>> {
        let sections = self.sections.sections_for(page_id).await?;
        if sections.is_empty() {
            return Err(CoreError::NotFound {
                entity: "Page",
                id: page_id,
            }
            .into());
        }

        let in_scope = match options.section_ids.as_deref() {
            Some(ids) if !ids.is_empty() => {
                sections.iter().filter(|s| ids.contains(&s.id)).count()
            }
            _ => sections.len(),
        };
        let max = self.config.max_sections_per_application;
        if in_scope > max {
            return Err(CoreError::Validation(format!(
                "{in_scope} sections in scope exceeds the limit of {max}"
            ))
            .into());
        }

        Ok(sections)
    }
}
