//! Filedrop API Library
//!
//! The synchronous front door: issues signed upload URLs, lists and deletes file
//! records, and hands out signed download and thumbnail URLs.

mod api_doc;
mod handlers;

pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::files::{FileService, FileServiceConfig};
pub use state::AppState;
