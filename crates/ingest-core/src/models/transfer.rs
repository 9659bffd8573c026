use serde::{Deserialize, Serialize};
use std::fmt;

/// Temporary, scoped credentials handed out with an upload slot.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryCredentials {
    pub access_key: String,
    pub secret_key: String,
    #[serde(rename = "token")]
    pub session_token: String,
    pub region: String,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Deserialize)]
struct SlotFile {
    #[serde(rename = "s3Key")]
    s3_key: String,
}

#[derive(Deserialize)]
struct RawUploadSlot {
    token: TemporaryCredentials,
    #[serde(rename = "s3Bucket")]
    s3_bucket: String,
    file: SlotFile,
}

/// A reserved destination for exactly one object.
///
/// Deserializes from the catalog's slot JSON
/// (`{token: {...}, s3Bucket, file: {s3Key}}`); any missing field is an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawUploadSlot")]
pub struct UploadSlot {
    pub credentials: TemporaryCredentials,
    pub destination_bucket: String,
    pub destination_key: String,
}

impl From<RawUploadSlot> for UploadSlot {
    fn from(raw: RawUploadSlot) -> Self {
        Self {
            credentials: raw.token,
            destination_bucket: raw.s3_bucket,
            destination_key: raw.file.s3_key,
        }
    }
}

/// Result of the destination PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub success: bool,
    pub http_status: u16,
    pub detail: String,
}

impl TransferOutcome {
    pub fn from_status(http_status: u16, detail: impl Into<String>) -> Self {
        Self {
            success: (200..300).contains(&http_status),
            http_status,
            detail: detail.into(),
        }
    }
}
