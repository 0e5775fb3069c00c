//! Metadata store setup

use anyhow::{Context, Result};
use filedrop_core::{Config, MetadataBackend};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::{MemoryMetadataStore, MetadataStore, PostgresMetadataStore};

/// Open a PostgreSQL connection pool sized from configuration.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .metadata
        .database_url
        .as_deref()
        .context("DATABASE_URL not configured")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.metadata.max_connections)
        .acquire_timeout(config.metadata.connect_timeout)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.metadata.max_connections,
        "Database connected successfully"
    );

    Ok(pool)
}

/// Build the configured metadata store, creating its table when needed.
pub async fn create_metadata_store(config: &Config) -> Result<Arc<dyn MetadataStore>> {
    match config.metadata.backend {
        MetadataBackend::Postgres => {
            let pool = connect_pool(config).await?;
            let store = PostgresMetadataStore::new(pool, config.metadata.table.clone())?;
            store
                .ensure_schema()
                .await
                .context("Failed to prepare metadata table")?;
            Ok(Arc::new(store))
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; records are lost on exit");
            Ok(Arc::new(MemoryMetadataStore::new()))
        }
    }
}
