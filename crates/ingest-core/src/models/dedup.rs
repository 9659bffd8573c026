use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Marker written after a successful transfer so redelivered events are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupEntry {
    pub fingerprint: String,
    /// Unix seconds after which the entry no longer suppresses anything.
    pub expires_at: i64,
}

impl DedupEntry {
    /// Entry for `fingerprint` expiring `ttl` after `now`.
    pub fn expiring_after(fingerprint: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            fingerprint: fingerprint.into(),
            expires_at: now.timestamp().saturating_add(ttl_secs),
        }
    }

    /// Stores purge expired rows lazily, so a present row may already be stale.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_is_now_plus_ttl() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let entry = DedupEntry::expiring_after("abc123", Duration::from_secs(600), now);
        assert_eq!(entry.expires_at, 1_700_000_600);
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(Utc.timestamp_opt(1_700_000_600, 0).unwrap()));
    }
}
