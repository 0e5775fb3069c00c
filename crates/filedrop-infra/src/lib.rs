//! Filedrop Infrastructure Library
//!
//! Shared plumbing for the API server and the workers:
//! - Telemetry initialization (tracing subscriber)
//! - Shutdown signal handling
//! - Request ID middleware

#[cfg(feature = "middleware")]
pub mod middleware;

pub mod shutdown;
pub mod telemetry;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use shutdown::{shutdown_signal, shutdown_token};
pub use telemetry::{init_telemetry, LogFormat};
