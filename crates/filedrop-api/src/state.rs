//! Application state shared by all handlers.

use filedrop_core::Config;
use filedrop_db::MetadataStore;
use filedrop_storage::Storage;
use std::sync::Arc;

use crate::services::files::{FileService, FileServiceConfig};

/// Process-wide adapter handles, built once at start-up and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub files: FileService,
    pub storage: Arc<dyn Storage>,
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    pub fn new(
        config: &Config,
        storage: Arc<dyn Storage>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let files = FileService::new(
            storage.clone(),
            metadata.clone(),
            FileServiceConfig::from(config),
        );

        Self {
            files,
            storage,
            metadata,
        }
    }
}
