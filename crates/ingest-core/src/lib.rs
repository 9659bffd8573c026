//! Ingest Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and
//! key-decoding helpers shared by every component of the catalog ingest relay.

pub mod config;
pub mod constants;
pub mod error;
pub mod keys;
pub mod models;

// Re-export commonly used types
pub use config::{DedupBackend, LogFormat, RelayConfig, UploadTarget};
pub use error::{LogLevel, RelayError, RelayResult, Stage};
pub use keys::{decode_object_key, search_stem};
pub use models::{
    AssetSummary, CatalogAsset, DedupEntry, IngestEvent, SearchResult, TemporaryCredentials,
    TransferOutcome, UploadSlot,
};
