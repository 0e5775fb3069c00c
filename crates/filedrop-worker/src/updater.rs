//! Pending → completed transition driven by storage notifications

use async_trait::async_trait;
use chrono::Utc;
use filedrop_core::models::CompletedUpload;
use filedrop_core::{AppError, FileRecord};
use filedrop_db::MetadataStore;
use std::sync::Arc;

use crate::events::{decode_object_key, ObjectEvent};
use crate::handler::{BatchReport, NotificationHandler};

/// Marks a file record completed once its object has been written.
///
/// The update is conditional on the record existing, so writes to keys that were
/// never issued through the API (thumbnails included) never create records.
pub struct MetadataUpdater {
    metadata: Arc<dyn MetadataStore>,
}

impl MetadataUpdater {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self { metadata }
    }

    /// Complete the record whose file id equals `key`.
    ///
    /// Returns `AppError::PreconditionFailed` when no record exists. Replaying the same
    /// notification completes the record again with the same values.
    #[tracing::instrument(skip(self))]
    pub async fn on_object_written(
        &self,
        bucket: &str,
        key: &str,
        size: u64,
        declared_content_type: Option<&str>,
    ) -> Result<FileRecord, AppError> {
        let update = CompletedUpload::from_notification(size, declared_content_type, Utc::now());
        let record = self.metadata.mark_completed(key, &update).await?;

        tracing::info!(
            file_id = %record.file_id,
            file_size = size,
            content_type = %record.content_type,
            "File upload completed"
        );

        Ok(record)
    }
}

#[async_trait]
impl NotificationHandler for MetadataUpdater {
    fn name(&self) -> &'static str {
        "metadata-updater"
    }

    async fn handle_notification(&self, events: &[ObjectEvent]) -> BatchReport {
        let mut report = BatchReport::default();

        for event in events {
            if !event.is_object_created() {
                tracing::debug!(event_name = %event.event_name, key = %event.key, "Ignoring non-write event");
                report.skipped += 1;
                continue;
            }

            let key = match decode_object_key(&event.key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::error!(error = %e, "Skipping record with undecodable key");
                    report.failed += 1;
                    continue;
                }
            };

            match self
                .on_object_written(&event.bucket, &key, event.size, event.content_type.as_deref())
                .await
            {
                Ok(_) => report.succeeded += 1,
                Err(AppError::PreconditionFailed(reason)) => {
                    tracing::warn!(key = %key, reason = %reason, "No pending record for written object");
                    report.skipped += 1;
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to complete file record");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedrop_core::FileStatus;
    use filedrop_db::MemoryMetadataStore;

    fn created(key: &str, size: u64, content_type: Option<&str>) -> ObjectEvent {
        ObjectEvent {
            event_name: "ObjectCreated:Put".to_string(),
            bucket: "uploads".to_string(),
            key: key.to_string(),
            size,
            content_type: content_type.map(str::to_string),
        }
    }

    async fn store_with_pending(ids: &[&str]) -> Arc<MemoryMetadataStore> {
        let store = Arc::new(MemoryMetadataStore::new());
        for id in ids {
            store
                .insert_pending(&FileRecord::pending(*id, "photo.png", "image/png", Utc::now()))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_completes_pending_record() {
        let store = store_with_pending(&["abc"]).await;
        let updater = MetadataUpdater::new(store.clone());

        let record = updater
            .on_object_written("uploads", "abc", 2048, Some("image/png"))
            .await
            .unwrap();

        assert_eq!(record.status, FileStatus::Completed);
        assert_eq!(record.file_size, Some(2048));
        assert_eq!(record.file_name, "photo.png");
        assert!(record.uploaded_at.is_some());
        assert_eq!(store.get("abc").await.unwrap().unwrap(), record);
    }

    #[tokio::test]
    async fn test_missing_content_type_falls_back() {
        let store = store_with_pending(&["abc"]).await;
        let updater = MetadataUpdater::new(store);

        let record = updater.on_object_written("uploads", "abc", 1, None).await.unwrap();
        assert_eq!(record.content_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_unknown_key_creates_nothing() {
        let store = store_with_pending(&[]).await;
        let updater = MetadataUpdater::new(store.clone());

        let err = updater
            .on_object_written("uploads", "thumbnails/abc.jpg", 10, Some("image/jpeg"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PreconditionFailed(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_replayed_notification_is_harmless() {
        let store = store_with_pending(&["abc"]).await;
        let updater = MetadataUpdater::new(store.clone());
        let batch = vec![created("abc", 512, Some("image/png"))];

        let first = updater.handle_notification(&batch).await;
        let second = updater.handle_notification(&batch).await;

        assert_eq!(first.succeeded, 1);
        assert_eq!(second.succeeded, 1);
        let record = store.get("abc").await.unwrap().unwrap();
        assert_eq!(record.status, FileStatus::Completed);
        assert_eq!(record.file_size, Some(512));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_second_delivery_leaves_record_unchanged() {
        let store = store_with_pending(&["abc"]).await;
        let updater = MetadataUpdater::new(store.clone());

        let first = updater
            .on_object_written("uploads", "abc", 100, Some("application/pdf"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let second = updater
            .on_object_written("uploads", "abc", 100, Some("application/pdf"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.get("abc").await.unwrap().unwrap(), first);
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let store = store_with_pending(&["first", "last"]).await;
        let updater = MetadataUpdater::new(store.clone());
        let batch = vec![
            created("first", 1, Some("image/png")),
            created("never-issued", 2, None),
            created("bad%FF", 3, None),
            ObjectEvent {
                event_name: "ObjectRemoved:Delete".to_string(),
                ..created("first", 0, None)
            },
            created("last", 4, Some("video/mp4")),
        ];

        let report = updater.handle_notification(&batch).await;

        assert_eq!(
            report,
            BatchReport {
                succeeded: 2,
                skipped: 2,
                failed: 1,
            }
        );
        assert_eq!(report.total(), batch.len());
        let last = store.get("last").await.unwrap().unwrap();
        assert_eq!(last.status, FileStatus::Completed);
        assert_eq!(last.content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_decodes_keys_before_lookup() {
        let store = store_with_pending(&["my file"]).await;
        let updater = MetadataUpdater::new(store.clone());

        let report = updater.handle_notification(&[created("my+file", 9, None)]).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(
            store.get("my file").await.unwrap().unwrap().status,
            FileStatus::Completed
        );
    }
}
