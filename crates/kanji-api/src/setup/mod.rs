//! Application setup and initialization
//!
//! Everything `main` needs, split out so integration tests can build the same
//! router around their own state.

pub mod routes;
pub mod server;

use crate::state::AppState;
use crate::telemetry::{init_telemetry, LogFormat};
use anyhow::{Context, Result};
use kanji_core::Config;
use kanji_processing::UploadScratch;
use kanji_providers::ProviderRegistry;
use std::sync::Arc;
use std::time::Duration;

/// Scratch files older than this at startup belong to a previous process
const ORPHAN_MAX_AGE: Duration = Duration::from_secs(3600);

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.server.environment,
        "Configuration loaded and validated successfully"
    );

    let state = build_state(config.clone()).await?;

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}

/// Create the scratch directory and the provider registry.
pub async fn build_state(config: Config) -> Result<Arc<AppState>> {
    let scratch = UploadScratch::new(&config.upload.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload.upload_dir.display()
            )
        })?;

    if let Err(e) = scratch.sweep_orphans(ORPHAN_MAX_AGE).await {
        tracing::warn!(error = %e, "Failed to sweep orphaned uploads");
    }

    let providers = ProviderRegistry::from_config(&config);
    let [ocr, dictionary, chat] = providers.provider_names();
    tracing::info!(
        ocr,
        dictionary,
        chat,
        ocr_max_concurrent = config.ocr.max_concurrent,
        dictionary_cache_capacity = config.dictionary_cache_capacity,
        "Providers registered"
    );

    Ok(Arc::new(AppState::new(config, scratch, providers)))
}
