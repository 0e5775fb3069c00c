//! Filedrop Core Library
//!
//! This crate provides the domain model, error types, configuration, and input
//! validation shared by the API and the event-driven workers.

pub mod backends;
pub mod config;
pub mod error;
pub mod media_kind;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use backends::{MetadataBackend, StorageBackend};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use media_kind::MediaKind;
pub use models::{FileRecord, FileStatus};
