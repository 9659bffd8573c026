use serde::Serialize;

use crate::keys::{decode_object_key, search_stem};

/// One object-created notification, reduced to what the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestEvent {
    bucket_name: String,
    /// Storage-encoded object key, exactly as delivered by the trigger.
    object_key: String,
    /// Content fingerprint (ETag) used as the dedup key.
    fingerprint: String,
}

impl IngestEvent {
    pub fn new(
        bucket_name: impl Into<String>,
        object_key: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
            fingerprint: fingerprint.into(),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The object key with storage encoding reversed.
    pub fn decoded_key(&self) -> String {
        decode_object_key(&self.object_key)
    }

    /// Query used to find the matching catalog asset.
    pub fn search_query(&self) -> String {
        search_stem(&self.object_key)
    }
}
