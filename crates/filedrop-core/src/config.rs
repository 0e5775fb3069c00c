//! Configuration module
//!
//! Environment-style configuration shared by the API server and the notification
//! workers. Values come from the process environment, optionally seeded from a
//! `.env` file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::backends::{MetadataBackend, StorageBackend};
use crate::validation::is_sql_identifier;

const SERVER_PORT: u16 = 3000;
const DB_MAX_CONNECTIONS: u32 = 10;
const DB_TIMEOUT_SECS: u64 = 30;
const THUMBNAIL_PREFIX: &str = "thumbnails/";
const THUMBNAIL_SIZE: u32 = 300;
const THUMBNAIL_QUALITY: u8 = 80;
const VIDEO_FRAME_OFFSET_SECS: f64 = 1.0;
const CONVERSION_TIMEOUT_SECS: u64 = 300;
const MAX_THUMBNAIL_SIZE: u32 = 4096;
const UPLOAD_URL_EXPIRY_SECS: u64 = 3600;
const LIST_LIMIT: u32 = 50;
const QUEUE_WAIT_TIME_SECS: i32 = 20;
const QUEUE_MAX_MESSAGES: i32 = 10;

/// Settings common to every process
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub log_format: String,
}

/// Object store settings (one logical bucket)
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub thumbnail_prefix: String,
    pub url_expiry: Duration,
}

/// Metadata table settings
#[derive(Clone, Debug)]
pub struct MetadataConfig {
    pub backend: MetadataBackend,
    pub database_url: Option<String>,
    pub table: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub list_limit: u32,
    /// Also remove the derived thumbnail when a file is deleted.
    pub delete_thumbnails: bool,
}

/// Media conversion settings
#[derive(Clone, Debug)]
pub struct ConversionConfig {
    pub ffmpeg_path: String,
    pub scratch_dir: PathBuf,
    pub thumbnail_size: u32,
    pub jpeg_quality: u8,
    pub frame_offset_secs: f64,
    pub timeout: Duration,
}

/// Notification queue settings for the worker
#[derive(Clone, Debug)]
pub struct QueueConfig {
    pub metadata_queue_url: Option<String>,
    pub converter_queue_url: Option<String>,
    pub wait_time_secs: i32,
    pub max_messages: i32,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub metadata: MetadataConfig,
    pub conversion: ConversionConfig,
    pub queues: QueueConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base = BaseConfig {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            server_port: var("SERVER_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SERVER_PORT),
            cors_origins: var("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            log_format: var("LOG_FORMAT")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend: storage_backend,
            bucket: var("S3_BUCKET").unwrap_or_default(),
            region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            endpoint: var("S3_ENDPOINT"),
            thumbnail_prefix: var("THUMBNAIL_PREFIX")
                .unwrap_or_else(|| THUMBNAIL_PREFIX.to_string()),
            url_expiry: Duration::from_secs(
                var("UPLOAD_URL_EXPIRY_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(UPLOAD_URL_EXPIRY_SECS),
            ),
        };

        let metadata_backend = match var("METADATA_BACKEND") {
            Some(s) => s.parse::<MetadataBackend>()?,
            None => MetadataBackend::Postgres,
        };

        let metadata = MetadataConfig {
            backend: metadata_backend,
            database_url: var("DATABASE_URL"),
            table: var("FILES_TABLE").unwrap_or_else(|| "files".to_string()),
            max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DB_MAX_CONNECTIONS),
            connect_timeout: Duration::from_secs(
                var("DB_TIMEOUT_SECONDS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DB_TIMEOUT_SECS),
            ),
            list_limit: var("LIST_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(LIST_LIMIT),
            delete_thumbnails: var("DELETE_THUMBNAILS")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        let conversion = ConversionConfig {
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            scratch_dir: var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            thumbnail_size: var("THUMBNAIL_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(THUMBNAIL_SIZE),
            jpeg_quality: var("THUMBNAIL_QUALITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(THUMBNAIL_QUALITY),
            frame_offset_secs: var("VIDEO_FRAME_OFFSET_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(VIDEO_FRAME_OFFSET_SECS),
            timeout: Duration::from_secs(
                var("CONVERSION_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(CONVERSION_TIMEOUT_SECS),
            ),
        };

        let queues = QueueConfig {
            metadata_queue_url: var("METADATA_QUEUE_URL"),
            converter_queue_url: var("CONVERTER_QUEUE_URL"),
            wait_time_secs: var("QUEUE_WAIT_TIME_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(QUEUE_WAIT_TIME_SECS)
                .clamp(0, 20),
            max_messages: var("QUEUE_MAX_MESSAGES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(QUEUE_MAX_MESSAGES)
                .clamp(1, 10),
        };

        let config = Config {
            base,
            storage,
            metadata,
            conversion,
            queues,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_empty() {
            return Err(anyhow::anyhow!(
                "S3_BUCKET must be set when STORAGE_BACKEND is s3"
            ));
        }

        if self.metadata.backend == MetadataBackend::Postgres
            && self.metadata.database_url.is_none()
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be set when METADATA_BACKEND is postgres"
            ));
        }

        if !is_sql_identifier(&self.metadata.table) {
            return Err(anyhow::anyhow!(
                "FILES_TABLE must be a plain SQL identifier, got {:?}",
                self.metadata.table
            ));
        }

        if self.storage.thumbnail_prefix.is_empty() || !self.storage.thumbnail_prefix.ends_with('/')
        {
            return Err(anyhow::anyhow!("THUMBNAIL_PREFIX must be non-empty and end with '/'"));
        }

        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if self
            .conversion
            .ffmpeg_path
            .chars()
            .any(|c| dangerous_chars.contains(&c))
        {
            return Err(anyhow::anyhow!(
                "FFMPEG_PATH contains dangerous characters"
            ));
        }

        if !(1..=MAX_THUMBNAIL_SIZE).contains(&self.conversion.thumbnail_size) {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_SIZE must be between 1 and {}",
                MAX_THUMBNAIL_SIZE
            ));
        }

        if !(1..=100).contains(&self.conversion.jpeg_quality) {
            return Err(anyhow::anyhow!("THUMBNAIL_QUALITY must be between 1 and 100"));
        }

        if self.metadata.list_limit == 0 {
            return Err(anyhow::anyhow!("LIST_LIMIT must be greater than zero"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn bucket(&self) -> &str {
        &self.storage.bucket
    }

    pub fn thumbnail_prefix(&self) -> &str {
        &self.storage.thumbnail_prefix
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.conversion.ffmpeg_path
    }

    pub fn table(&self) -> &str {
        &self.metadata.table
    }
}
