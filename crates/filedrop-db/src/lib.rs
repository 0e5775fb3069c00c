//! Filedrop metadata store
//!
//! One record per issued upload, keyed by file id. Writes that race with storage
//! notifications are conditional: a record is only created when absent and only
//! completed when present.

pub mod factory;
pub mod memory;
pub mod postgres;
pub mod store;

pub use factory::{connect_pool, create_metadata_store};
pub use memory::MemoryMetadataStore;
pub use postgres::PostgresMetadataStore;
pub use store::MetadataStore;
