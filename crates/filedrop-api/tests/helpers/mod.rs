//! Test helpers: build AppState and router over in-memory adapters.

use axum_test::TestServer;
use filedrop_api::setup::routes;
use filedrop_api::AppState;
use filedrop_core::Config;
use filedrop_db::MemoryMetadataStore;
use filedrop_storage::MemoryStorage;
use std::collections::HashMap;
use std::sync::Arc;

pub struct TestApp {
    pub server: TestServer,
    pub storage: MemoryStorage,
    pub metadata: MemoryMetadataStore,
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("STORAGE_BACKEND", "memory"),
        ("METADATA_BACKEND", "memory"),
        ("S3_BUCKET", "filedrop-test"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(&[])
}

pub fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let config = test_config(overrides);
    let storage = MemoryStorage::new(config.bucket());
    let metadata = MemoryMetadataStore::new();

    let state = Arc::new(AppState::new(
        &config,
        Arc::new(storage.clone()),
        Arc::new(metadata.clone()),
    ));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        storage,
        metadata,
    }
}
