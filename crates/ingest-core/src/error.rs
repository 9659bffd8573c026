//! Error types module
//!
//! Every fatal condition of the pipeline is a [`RelayError`]. Skips (bucket
//! mismatch, dedup hit, empty search) are not errors and never show up here.
//! Each variant carries the [`Stage`] that produced it so the diagnostic
//! trail always names the step that failed.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Warning level - for conditions an operator can fix (bad config, rejected credentials)
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Pipeline step that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DedupLookup,
    Search,
    Fetch,
    AssetSummary,
    InitiateUpload,
    SignWriteUrl,
    Upload,
    DedupRecord,
    CurrentUser,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::DedupLookup => "dedup_lookup",
            Stage::Search => "search",
            Stage::Fetch => "fetch",
            Stage::AssetSummary => "asset_summary",
            Stage::InitiateUpload => "initiate_upload",
            Stage::SignWriteUrl => "sign_write_url",
            Stage::Upload => "upload",
            Stage::DedupRecord => "dedup_record",
            Stage::CurrentUser => "current_user",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A network call failed or timed out before a response was received.
    #[error("Transport error during {stage}: {message}")]
    Transport { stage: Stage, message: String },

    /// A response arrived with a non-success status.
    #[error("Request during {stage} failed with status {status}: {body}")]
    HttpStatus {
        stage: Stage,
        status: u16,
        body: String,
    },

    /// A response was received but did not have the expected shape.
    #[error("Unexpected response during {stage}: {message}")]
    Structural { stage: Stage, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    pub fn transport(stage: Stage, err: impl Display) -> Self {
        RelayError::Transport {
            stage,
            message: err.to_string(),
        }
    }

    pub fn structural(stage: Stage, err: impl Display) -> Self {
        RelayError::Structural {
            stage,
            message: err.to_string(),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            RelayError::Transport { stage, .. }
            | RelayError::HttpStatus { stage, .. }
            | RelayError::Structural { stage, .. } => Some(*stage),
            RelayError::Config(_) => None,
        }
    }

    /// HTTP status captured with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RelayError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the destination PUT was rejected by the object store.
    pub fn is_upload_rejection(&self) -> bool {
        matches!(
            self,
            RelayError::HttpStatus {
                stage: Stage::Upload,
                ..
            }
        )
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            RelayError::Config(_) => LogLevel::Warn,
            // Catalog credential rejections. Destination PUT rejections stay errors.
            RelayError::HttpStatus { stage, status, .. }
                if *stage != Stage::Upload && (*status == 401 || *status == 403) =>
            {
                LogLevel::Warn
            }
            _ => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_rejection_is_detected_by_stage() {
        let err = RelayError::HttpStatus {
            stage: Stage::Upload,
            status: 403,
            body: "AccessDenied".to_string(),
        };
        assert!(err.is_upload_rejection());
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.stage(), Some(Stage::Upload));

        let search = RelayError::HttpStatus {
            stage: Stage::Search,
            status: 500,
            body: String::new(),
        };
        assert!(!search.is_upload_rejection());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn catalog_auth_rejection_is_a_warning() {
        let err = RelayError::HttpStatus {
            stage: Stage::Search,
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn display_names_the_stage() {
        let err = RelayError::transport(Stage::Fetch, "connection reset");
        assert_eq!(
            err.to_string(),
            "Transport error during fetch: connection reset"
        );
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn config_errors_have_no_stage() {
        let err = RelayError::Config("BUCKET missing".to_string());
        assert_eq!(err.stage(), None);
        assert_eq!(err.log_level(), LogLevel::Warn);
    }
}
