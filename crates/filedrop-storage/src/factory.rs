#[cfg(feature = "storage-memory")]
use crate::MemoryStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use filedrop_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            if config.storage.bucket.is_empty() {
                return Err(StorageError::ConfigError(
                    "S3_BUCKET not configured".to_string(),
                ));
            }

            let storage = S3Storage::new(
                config.storage.bucket.clone(),
                config.storage.region.clone(),
                config.storage.endpoint.clone(),
            )
            .await?;
            tracing::info!(bucket = %config.storage.bucket, "Using S3 object store");
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => {
            let bucket = if config.storage.bucket.is_empty() {
                "filedrop-local".to_string()
            } else {
                config.storage.bucket.clone()
            };
            tracing::warn!(bucket = %bucket, "Using in-memory object store; objects are lost on exit");
            Ok(Arc::new(MemoryStorage::new(bucket)))
        }

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)".to_string(),
        )),
    }
}
