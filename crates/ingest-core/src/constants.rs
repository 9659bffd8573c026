//! Policy constants for the transfer pipeline.
//!
//! These are the defaults; most of them can be overridden through the
//! environment (see [`crate::config::RelayConfig`]).

/// How long a dedup entry suppresses repeated events for the same fingerprint.
pub const DEDUP_TTL_SECS: u64 = 600;

/// Per-call timeout for every outbound HTTP request.
pub const HTTP_TIMEOUT_SECS: u64 = 300;

/// Lifetime of the signed GET URL issued for the source object.
pub const READ_URL_EXPIRY_SECS: u64 = 300;

/// Lifetime of the signed PUT URL issued for the destination slot.
pub const WRITE_URL_EXPIRY_SECS: u64 = 3600;

/// Upper bound on the number of search hits requested from the catalog.
pub const SEARCH_PAGE_SIZE: u32 = 5001;

/// Default dedup table name.
pub const DEDUP_TABLE: &str = "IngestAntiDupe";

/// Default dedup table region.
pub const DEDUP_REGION: &str = "us-east-1";

/// Primary key attribute of the dedup table.
pub const DEDUP_KEY_ATTR: &str = "EventETag";

/// Expiry attribute of the dedup table (unix seconds).
pub const DEDUP_EXPIRES_ATTR: &str = "Expires";

/// Catalog API version prefix.
pub const CATALOG_API_PREFIX: &str = "/v1";

/// Header carrying the catalog API key.
pub const CATALOG_API_KEY_HEADER: &str = "x-globaledit-api-key";

/// Header carrying the catalog user id.
pub const CATALOG_USER_HEADER: &str = "x-globaledit-userid";

/// Content type used when the source object does not declare one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";
