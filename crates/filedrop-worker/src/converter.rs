//! Thumbnail generation driven by storage notifications

use async_trait::async_trait;
use filedrop_core::MediaKind;
use filedrop_processing::{ProcessingError, ThumbnailRenderer, THUMBNAIL_CONTENT_TYPE};
use filedrop_storage::{Storage, StorageError, ThumbnailKeys};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::events::{decode_object_key, EventError, ObjectEvent};
use crate::handler::{BatchReport, NotificationHandler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The key is itself a thumbnail; converting it would loop
    ThumbnailPrefix,
    /// The object lives in a bucket this converter is not bound to
    ForeignBucket(String),
    /// Declared content type is neither image nor video
    Unsupported(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Skipped(SkipReason),
    Stored { thumbnail_key: String, bytes: usize },
}

#[derive(Debug, Error)]
pub enum ConversionFailure {
    #[error(transparent)]
    Key(#[from] EventError),

    #[error("Failed to probe object: {0}")]
    Probe(#[source] StorageError),

    #[error("Failed to download object: {0}")]
    Download(#[source] StorageError),

    #[error("Failed to render thumbnail: {0}")]
    Render(#[from] ProcessingError),

    #[error("Failed to store thumbnail: {0}")]
    Store(#[source] StorageError),
}

/// Writes a JPEG thumbnail for every image or video written to the bucket.
///
/// The thumbnail lands under the thumbnail prefix of the same bucket, which emits
/// another write notification; keys under that prefix are skipped before any
/// storage call is made.
pub struct MediaConverter {
    storage: Arc<dyn Storage>,
    renderer: ThumbnailRenderer,
    keys: ThumbnailKeys,
    timeout: Duration,
}

impl MediaConverter {
    pub fn new(
        storage: Arc<dyn Storage>,
        renderer: ThumbnailRenderer,
        keys: ThumbnailKeys,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            renderer,
            keys,
            timeout,
        }
    }

    /// Convert one written object. `raw_key` is the key as it appears in the notification.
    #[tracing::instrument(skip(self))]
    pub async fn on_object_created(
        &self,
        bucket: &str,
        raw_key: &str,
    ) -> Result<ConversionOutcome, ConversionFailure> {
        let key = decode_object_key(raw_key)?;

        if self.keys.is_thumbnail(&key) {
            tracing::debug!("Skipping thumbnail object");
            return Ok(ConversionOutcome::Skipped(SkipReason::ThumbnailPrefix));
        }

        if bucket != self.storage.bucket() {
            tracing::warn!(expected = %self.storage.bucket(), "Notification for another bucket");
            return Ok(ConversionOutcome::Skipped(SkipReason::ForeignBucket(
                bucket.to_string(),
            )));
        }

        let head = self
            .storage
            .head(&key)
            .await
            .map_err(ConversionFailure::Probe)?;

        let kind = MediaKind::from_content_type(head.content_type.as_deref());
        if !kind.is_convertible() {
            tracing::info!(content_type = ?head.content_type, "Skipping unsupported media");
            return Ok(ConversionOutcome::Skipped(SkipReason::Unsupported(
                head.content_type,
            )));
        }

        let data = self
            .storage
            .get(&key)
            .await
            .map_err(ConversionFailure::Download)?;

        let thumbnail = self.renderer.render(kind, data).await?;

        let thumbnail_key = self.keys.thumbnail_key(&key);
        let bytes = thumbnail.len();
        self.storage
            .put(&thumbnail_key, thumbnail, THUMBNAIL_CONTENT_TYPE)
            .await
            .map_err(ConversionFailure::Store)?;

        tracing::info!(
            media_kind = %kind,
            source_bytes = head.content_length,
            thumbnail_key = %thumbnail_key,
            thumbnail_bytes = bytes,
            "Thumbnail stored"
        );

        Ok(ConversionOutcome::Stored {
            thumbnail_key,
            bytes,
        })
    }

    async fn convert_all(&self, events: &[ObjectEvent], report: &mut BatchReport) {
        for event in events {
            if !event.is_object_created() {
                report.skipped += 1;
                continue;
            }

            match self.on_object_created(&event.bucket, &event.key).await {
                Ok(ConversionOutcome::Stored { .. }) => report.succeeded += 1,
                Ok(ConversionOutcome::Skipped(_)) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        bucket = %event.bucket,
                        key = %event.key,
                        error = %e,
                        "Thumbnail conversion failed"
                    );
                    report.failed += 1;
                }
            }
        }
    }
}

#[async_trait]
impl NotificationHandler for MediaConverter {
    fn name(&self) -> &'static str {
        "media-converter"
    }

    fn invocation_budget(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    /// Convert every record of one notification within the conversion timeout.
    ///
    /// When the budget runs out the in-flight conversion is dropped, which kills any
    /// `ffmpeg` child and removes its scratch files. Unfinished records count as failed.
    async fn handle_notification(&self, events: &[ObjectEvent]) -> BatchReport {
        let mut report = BatchReport::default();

        let within_budget =
            tokio::time::timeout(self.timeout, self.convert_all(events, &mut report)).await;

        if within_budget.is_err() {
            let unfinished = events.len().saturating_sub(report.total());
            tracing::error!(
                timeout_secs = self.timeout.as_secs(),
                unfinished,
                "Conversion timed out"
            );
            report.failed += unfinished;
        }

        report
    }
}
