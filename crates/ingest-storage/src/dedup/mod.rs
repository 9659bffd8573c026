//! Dedup store abstraction
//!
//! A key-value table keyed by content fingerprint. Rows carry an expiry and
//! are purged by the store itself; the relay never deletes them.

#[cfg(feature = "dedup-dynamodb")]
pub mod dynamo;
pub mod memory;

use async_trait::async_trait;
use ingest_core::models::DedupEntry;
use ingest_core::{DedupBackend, RelayResult};
use std::time::Duration;

/// Dedup store trait
///
/// `lookup` followed by `record` is not atomic: two concurrent invocations for
/// the same fingerprint can both miss and both transfer.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Point read by fingerprint. Absence is `Ok(None)`, never an error.
    ///
    /// A returned entry may already be past its expiry if the store has not
    /// purged it yet; callers decide whether it still counts.
    async fn lookup(&self, fingerprint: &str) -> RelayResult<Option<DedupEntry>>;

    /// Write an entry expiring `ttl` from now and return it.
    async fn record(&self, fingerprint: &str, ttl: Duration) -> RelayResult<DedupEntry>;

    fn backend_type(&self) -> DedupBackend;
}
