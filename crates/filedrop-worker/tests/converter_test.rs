//! Media converter against the in-memory object store.

use async_trait::async_trait;
use bytes::Bytes;
use filedrop_processing::{ThumbnailRenderer, ThumbnailSettings};
use filedrop_storage::{
    MemoryStorage, ObjectHead, Storage, StorageBackend, StorageResult, ThumbnailKeys,
};
use filedrop_worker::{
    BatchReport, ConversionFailure, ConversionOutcome, MediaConverter, NotificationHandler,
    ObjectEvent, SkipReason,
};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const BUCKET: &str = "uploads";

/// Counts every call that reaches the wrapped store.
struct CountingStorage {
    inner: MemoryStorage,
    calls: AtomicUsize,
    head_delay: Duration,
}

impl CountingStorage {
    fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            head_delay: Duration::ZERO,
        }
    }

    fn with_head_delay(mut self, delay: Duration) -> Self {
        self.head_delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.hit();
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.hit();
        self.inner.get(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        self.hit();
        tokio::time::sleep(self.head_delay).await;
        self.inner.head(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.hit();
        self.inner.delete(key).await
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.hit();
        self.inner.presigned_get_url(key, expires_in).await
    }

    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        content_disposition: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.hit();
        self.inner
            .presigned_put_url(key, content_type, content_disposition, expires_in)
            .await
    }

    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

fn png(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 90]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    Bytes::from(buffer)
}

fn converter(storage: Arc<dyn Storage>) -> MediaConverter {
    converter_with_timeout(storage, Duration::from_secs(30))
}

fn converter_with_timeout(storage: Arc<dyn Storage>, timeout: Duration) -> MediaConverter {
    MediaConverter::new(
        storage,
        ThumbnailRenderer::new(ThumbnailSettings::default()).unwrap(),
        ThumbnailKeys::default(),
        timeout,
    )
}

fn created(key: &str) -> ObjectEvent {
    ObjectEvent {
        event_name: "ObjectCreated:Put".to_string(),
        bucket: BUCKET.to_string(),
        key: key.to_string(),
        size: 0,
        content_type: None,
    }
}

#[tokio::test]
async fn test_image_upload_gets_square_jpeg_thumbnail() {
    let storage = Arc::new(MemoryStorage::new(BUCKET));
    storage.put("abc", png(800, 450), "image/png").await.unwrap();

    let outcome = converter(storage.clone())
        .on_object_created(BUCKET, "abc")
        .await
        .unwrap();

    let ConversionOutcome::Stored { thumbnail_key, bytes } = outcome else {
        panic!("expected a stored thumbnail, got {outcome:?}");
    };
    assert_eq!(thumbnail_key, "thumbnails/abc.jpg");

    let head = storage.head(&thumbnail_key).await.unwrap();
    assert_eq!(head.content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(head.content_length as usize, bytes);

    let thumbnail = storage.get(&thumbnail_key).await.unwrap();
    let decoded = image::load_from_memory(&thumbnail).unwrap();
    assert_eq!(decoded.dimensions(), (300, 300));
}

#[tokio::test]
async fn test_thumbnail_keys_never_touch_storage() {
    let storage = Arc::new(CountingStorage::new(MemoryStorage::new(BUCKET)));

    let outcome = converter(storage.clone())
        .on_object_created(BUCKET, "thumbnails/abc.jpg")
        .await
        .unwrap();

    assert_eq!(outcome, ConversionOutcome::Skipped(SkipReason::ThumbnailPrefix));
    assert_eq!(storage.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_content_is_skipped_without_download() {
    let storage = Arc::new(CountingStorage::new(MemoryStorage::new(BUCKET)));
    storage
        .inner
        .put("doc", Bytes::from_static(b"%PDF-1.7"), "application/pdf")
        .await
        .unwrap();

    let outcome = converter(storage.clone())
        .on_object_created(BUCKET, "doc")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ConversionOutcome::Skipped(SkipReason::Unsupported(Some(
            "application/pdf".to_string()
        )))
    );
    // Only the probe
    assert_eq!(storage.calls(), 1);
    assert_eq!(storage.inner.keys().await, vec!["doc"]);
}

#[tokio::test]
async fn test_foreign_bucket_is_skipped() {
    let storage = Arc::new(CountingStorage::new(MemoryStorage::new(BUCKET)));

    let outcome = converter(storage.clone())
        .on_object_created("someone-elses-bucket", "abc")
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ConversionOutcome::Skipped(SkipReason::ForeignBucket(_))
    ));
    assert_eq!(storage.calls(), 0);
}

#[tokio::test]
async fn test_encoded_keys_are_decoded() {
    let storage = Arc::new(MemoryStorage::new(BUCKET));
    storage
        .put("my photo(1)", png(40, 40), "image/png")
        .await
        .unwrap();

    let outcome = converter(storage.clone())
        .on_object_created(BUCKET, "my+photo%281%29")
        .await
        .unwrap();

    assert!(matches!(outcome, ConversionOutcome::Stored { .. }));
    assert!(storage.contains("thumbnails/my photo(1).jpg").await);
}

#[tokio::test]
async fn test_missing_object_is_a_probe_failure() {
    let storage = Arc::new(MemoryStorage::new(BUCKET));

    let err = converter(storage)
        .on_object_created(BUCKET, "gone")
        .await
        .unwrap_err();

    assert!(matches!(err, ConversionFailure::Probe(_)));
}

#[tokio::test]
async fn test_corrupt_image_fails_without_writing() {
    let storage = Arc::new(MemoryStorage::new(BUCKET));
    storage
        .put("broken", Bytes::from_static(b"\x89PNG\r\n\x1a\ntruncated"), "image/png")
        .await
        .unwrap();

    let err = converter(storage.clone())
        .on_object_created(BUCKET, "broken")
        .await
        .unwrap_err();

    assert!(matches!(err, ConversionFailure::Render(_)));
    assert!(!storage.contains("thumbnails/broken.jpg").await);
}

#[tokio::test]
async fn test_batch_swallows_failures_and_keeps_going() {
    let storage = Arc::new(MemoryStorage::new(BUCKET));
    storage
        .put("broken", Bytes::from_static(b"not an image"), "image/jpeg")
        .await
        .unwrap();
    storage.put("good", png(120, 90), "image/png").await.unwrap();
    storage
        .put("notes", Bytes::from_static(b"hello"), "text/plain")
        .await
        .unwrap();

    let batch = vec![
        created("broken"),
        created("thumbnails/good.jpg"),
        created("notes"),
        created("good"),
    ];
    let report = converter(storage.clone()).handle_notification(&batch).await;

    assert_eq!(
        report,
        BatchReport {
            succeeded: 1,
            skipped: 2,
            failed: 1,
        }
    );
    assert!(storage.contains("thumbnails/good.jpg").await);
    assert!(!storage.contains("thumbnails/broken.jpg").await);
}

#[tokio::test]
async fn test_own_thumbnail_notification_does_not_loop() {
    let storage = Arc::new(MemoryStorage::new(BUCKET));
    storage.put("abc", png(64, 64), "image/png").await.unwrap();
    let converter = converter(storage.clone());

    converter.handle_notification(&[created("abc")]).await;
    // The thumbnail write is delivered back to the converter
    let report = converter
        .handle_notification(&[created("thumbnails/abc.jpg")])
        .await;

    assert_eq!(report.skipped, 1);
    assert_eq!(storage.keys().await, vec!["abc", "thumbnails/abc.jpg"]);
}

#[tokio::test]
async fn test_timeout_bounds_the_whole_notification() {
    let inner = MemoryStorage::new(BUCKET);
    for key in ["a", "b", "c"] {
        inner.put(key, png(32, 32), "image/png").await.unwrap();
    }
    let storage =
        Arc::new(CountingStorage::new(inner).with_head_delay(Duration::from_millis(80)));
    let converter = converter_with_timeout(storage.clone(), Duration::from_millis(200));
    assert_eq!(
        converter.invocation_budget(),
        Some(Duration::from_millis(200))
    );

    let started = std::time::Instant::now();
    let report = converter
        .handle_notification(&[created("a"), created("b"), created("c"), created("d")])
        .await;

    // Each record fits the budget on its own; together they do not
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(report.failed >= 1, "{report:?}");
    assert_eq!(report.total(), 4);
    assert!(!storage.inner.contains("thumbnails/d.jpg").await);
}
