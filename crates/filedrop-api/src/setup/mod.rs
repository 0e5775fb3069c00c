//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use filedrop_core::Config;
use std::sync::Arc;

/// Build adapters, state and router from configuration.
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    tracing::info!(
        environment = %config.base.environment,
        storage_backend = %config.storage.backend,
        metadata_backend = %config.metadata.backend,
        "Configuration loaded and validated successfully"
    );

    let storage = filedrop_storage::create_storage(config)
        .await
        .context("Failed to initialize object store")?;
    let metadata = filedrop_db::create_metadata_store(config)
        .await
        .context("Failed to initialize metadata store")?;

    let state = Arc::new(AppState::new(config, storage, metadata));
    let router = routes::setup_routes(config, state.clone())?;

    Ok((state, router))
}
