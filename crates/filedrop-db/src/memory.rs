use async_trait::async_trait;
use filedrop_core::models::CompletedUpload;
use filedrop_core::{AppError, FileRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::MetadataStore;

/// In-process metadata table for local development and tests.
#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    records: Arc<RwLock<HashMap<String, FileRecord>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert_pending(&self, record: &FileRecord) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.file_id) {
            return Err(AppError::PreconditionFailed(format!(
                "File {} already exists",
                record.file_id
            )));
        }
        records.insert(record.file_id.clone(), record.clone());
        Ok(())
    }

    async fn mark_completed(
        &self,
        file_id: &str,
        update: &CompletedUpload,
    ) -> Result<FileRecord, AppError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(file_id).ok_or_else(|| {
            AppError::PreconditionFailed(format!("No metadata record for file {}", file_id))
        })?;
        record.apply_completion(update);
        Ok(record.clone())
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileRecord>, AppError> {
        Ok(self.records.read().await.get(file_id).cloned())
    }

    async fn scan(&self, limit: u32) -> Result<Vec<FileRecord>, AppError> {
        let records = self.records.read().await;
        let mut items: Vec<FileRecord> = records.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn delete(&self, file_id: &str) -> Result<(), AppError> {
        self.records.write().await.remove(file_id);
        Ok(())
    }
}
