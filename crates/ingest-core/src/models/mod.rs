//! Data models for the relay
//!
//! Everything here is transient and scoped to one invocation except
//! [`DedupEntry`], which outlives it in the dedup store.

mod catalog;
mod dedup;
mod event;
mod transfer;

pub use catalog::{AssetSummary, CatalogAsset, SearchResult};
pub use dedup::DedupEntry;
pub use event::IngestEvent;
pub use transfer::{TemporaryCredentials, TransferOutcome, UploadSlot};
