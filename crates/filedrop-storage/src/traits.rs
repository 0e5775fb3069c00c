//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use filedrop_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Metadata returned by a HEAD-style probe. The body is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub content_type: Option<String>,
    pub content_length: u64,
}

/// Storage abstraction trait
///
/// Every method operates on a key inside the single configured bucket.
/// Signed URLs are handed to clients, who then talk to the object store directly.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object, replacing any existing one under the same key.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Read a whole object.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Probe an object's metadata.
    ///
    /// Returns `StorageError::NotFound` when no object exists under `key`.
    async fn head(&self, key: &str) -> StorageResult<ObjectHead>;

    /// Delete an object. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Time-limited URL authorizing a GET of `key`.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Time-limited URL authorizing a PUT of `key`.
    ///
    /// The signature binds the `Content-Type` and `Content-Disposition` headers, so the
    /// client must send exactly these values.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        content_disposition: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Name of the bucket this adapter is bound to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
