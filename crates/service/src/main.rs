use std::sync::Arc;

use pagecraft_core::brandkit::Brandkit;
use pagecraft_core::brandkit_apply::ApplicationOptions;
use pagecraft_core::section::Section;
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagecraft_service::{EngineConfig, EngineService, InMemoryStore, ServiceError, ServiceResult};

/// Page id the input sections are loaded under.
const PREVIEW_PAGE_ID: i64 = 1;

/// Input document: a page's sections, the brandkit to try and optional options.
#[derive(Debug, Deserialize)]
struct PreviewInput {
    sections: Vec<Section>,
    brandkit: Brandkit,
    #[serde(default)]
    options: Option<ApplicationOptions>,
}

#[tokio::main]
async fn main() -> ServiceResult<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagecraft_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = EngineConfig::from_env();
    tracing::info!(
        policy = %config.conflict_resolution,
        preserve = config.preserve_customizations,
        "Loaded engine configuration"
    );

    // --- Input ---
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| ServiceError::InvalidInput("usage: pagecraft-preview <input.json>".into()))?;
    let raw = tokio::fs::read_to_string(&path).await?;
    let input: PreviewInput = serde_json::from_str(&raw)?;
    tracing::info!(
        path = %path,
        sections = input.sections.len(),
        brandkit = %input.brandkit.name,
        "Loaded preview input"
    );

    // --- Store ---
    let store = Arc::new(InMemoryStore::new());
    let brandkit = store.put_brandkit(input.brandkit).await?;
    store.put_sections(PREVIEW_PAGE_ID, input.sections).await;

    // --- Preview ---
    let service = EngineService::with_store(store, config);
    let preview = service
        .preview(PREVIEW_PAGE_ID, Some(brandkit.id), input.options.clone())
        .await?;
    let compatibility = service
        .validate(PREVIEW_PAGE_ID, Some(brandkit.id), input.options)
        .await?;

    let output = serde_json::json!({
        "preview": preview,
        "compatibility": compatibility,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
