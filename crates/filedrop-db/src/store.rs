use async_trait::async_trait;
use filedrop_core::models::CompletedUpload;
use filedrop_core::{AppError, FileRecord};

/// Data access for file records.
///
/// Conditional writes report a missing or conflicting row as
/// `AppError::PreconditionFailed` so callers can tell it apart from transport errors.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create a pending record. Fails with `PreconditionFailed` if the id is taken.
    async fn insert_pending(&self, record: &FileRecord) -> Result<(), AppError>;

    /// Transition an existing record to completed and return the stored result.
    ///
    /// Never creates a record: when `file_id` is absent this fails with
    /// `PreconditionFailed`. Applying the same completion twice is harmless.
    async fn mark_completed(
        &self,
        file_id: &str,
        update: &CompletedUpload,
    ) -> Result<FileRecord, AppError>;

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>, AppError>;

    /// Up to `limit` records in no guaranteed order.
    async fn scan(&self, limit: u32) -> Result<Vec<FileRecord>, AppError>;

    /// Remove a record. Removing an absent id succeeds.
    async fn delete(&self, file_id: &str) -> Result<(), AppError>;
}
