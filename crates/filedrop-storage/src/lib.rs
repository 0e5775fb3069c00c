//! Filedrop Storage Library
//!
//! Object store adapter used by the API and the workers. It exposes the
//! `Storage` trait with an S3 implementation and an in-memory one for local
//! development and tests.
//!
//! # Storage key format
//!
//! All objects live in one bucket:
//!
//! - **Originals**: `{file_id}` (the identifier doubles as the key)
//! - **Thumbnails**: `{thumbnail_prefix}{original_key}.jpg`, by default `thumbnails/{file_id}.jpg`
//!
//! Key derivation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use filedrop_core::StorageBackend;
pub use keys::ThumbnailKeys;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectHead, Storage, StorageError, StorageResult};
