//! In-process dedup store.
//!
//! Used for local runs (`DEDUP_BACKEND=memory`) and as the store behind
//! pipeline tests. Entries live as long as the process.

use async_trait::async_trait;
use chrono::Utc;
use ingest_core::models::DedupEntry;
use ingest_core::{DedupBackend, RelayError, RelayResult, Stage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::DedupStore;

#[derive(Clone, Default)]
pub struct MemoryDedupStore {
    entries: Arc<Mutex<HashMap<String, DedupEntry>>>,
    unavailable: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
    records: Arc<AtomicUsize>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry directly, bypassing the TTL computation.
    pub async fn insert(&self, entry: DedupEntry) {
        self.entries
            .lock()
            .await
            .insert(entry.fingerprint.clone(), entry);
    }

    pub async fn get(&self, fingerprint: &str) -> Option<DedupEntry> {
        self.entries.lock().await.get(fingerprint).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Make every subsequent call fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn record_count(&self) -> usize {
        self.records.load(Ordering::SeqCst)
    }

    fn check_available(&self, stage: Stage) -> RelayResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RelayError::transport(stage, "dedup store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    async fn lookup(&self, fingerprint: &str) -> RelayResult<Option<DedupEntry>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available(Stage::DedupLookup)?;
        Ok(self.entries.lock().await.get(fingerprint).cloned())
    }

    async fn record(&self, fingerprint: &str, ttl: Duration) -> RelayResult<DedupEntry> {
        self.records.fetch_add(1, Ordering::SeqCst);
        self.check_available(Stage::DedupRecord)?;
        let entry = DedupEntry::expiring_after(fingerprint, ttl, Utc::now());
        self.entries
            .lock()
            .await
            .insert(fingerprint.to_string(), entry.clone());
        Ok(entry)
    }

    fn backend_type(&self) -> DedupBackend {
        DedupBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_misses_until_recorded() {
        let store = MemoryDedupStore::new();
        assert!(store.lookup("abc123").await.unwrap().is_none());

        let before = Utc::now().timestamp();
        let entry = store
            .record("abc123", Duration::from_secs(600))
            .await
            .unwrap();
        let after = Utc::now().timestamp();
        assert!(entry.expires_at >= before + 600 && entry.expires_at <= after + 600);

        let found = store.lookup("abc123").await.unwrap().unwrap();
        assert_eq!(found, entry);
        assert_eq!(store.lookup_count(), 2);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_with_stage() {
        let store = MemoryDedupStore::new();
        store.set_unavailable(true);

        let err = store.lookup("abc123").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::DedupLookup));

        let err = store
            .record("abc123", Duration::from_secs(600))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::DedupRecord));
        assert!(store.is_empty().await);
    }
}
