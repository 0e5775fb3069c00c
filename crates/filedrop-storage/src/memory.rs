use crate::keys::validate_key;
use crate::traits::{ObjectHead, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// In-process object store
///
/// Signed URLs use a `memory://` scheme and are only meaningful to code that
/// inspects them; nothing serves them over HTTP.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    bucket: String,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// All stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_key(key: &str) -> StorageResult<()> {
        validate_key(key).map_err(StorageError::InvalidKey)
    }

    fn signed_url(&self, key: &str, method: &str, expires_in: Duration) -> String {
        format!(
            "memory://{}/{}?method={}&expires={}",
            self.bucket,
            urlencoding::encode(key),
            method,
            expires_in.as_secs()
        )
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        Self::check_key(key)?;
        let size = data.len();
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        tracing::debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Stored object in memory");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        Self::check_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectHead> {
        Self::check_key(key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|object| ObjectHead {
                content_type: Some(object.content_type.clone()),
                content_length: object.data.len() as u64,
            })
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        Self::check_key(key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        Self::check_key(key)?;
        Ok(self.signed_url(key, "GET", expires_in))
    }

    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        content_disposition: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Self::check_key(key)?;
        Ok(format!(
            "{}&content-type={}&content-disposition={}",
            self.signed_url(key, "PUT", expires_in),
            urlencoding::encode(content_type),
            urlencoding::encode(content_disposition)
        ))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
