//! Configuration module
//!
//! The relay is configured entirely from the environment, read once at
//! process start. A local `.env` file is honoured for development runs.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use crate::constants;

/// Dedup store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupBackend {
    DynamoDb,
    Memory,
}

impl FromStr for DedupBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(DedupBackend::DynamoDb),
            "memory" => Ok(DedupBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid dedup backend: {}", s)),
        }
    }
}

impl Display for DedupBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DedupBackend::DynamoDb => write!(f, "dynamodb"),
            DedupBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Which kind of catalog slot an object is uploaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Attach the object to the matched asset.
    Attachment,
    /// Upload the object as a new version of the matched asset.
    Version,
}

impl FromStr for UploadTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attachment" => Ok(UploadTarget::Attachment),
            "version" => Ok(UploadTarget::Version),
            _ => Err(anyhow::anyhow!("Invalid upload target: {}", s)),
        }
    }
}

impl Display for UploadTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadTarget::Attachment => write!(f, "attachment"),
            UploadTarget::Version => write!(f, "version"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Relay configuration.
#[derive(Clone)]
pub struct RelayConfig {
    // Catalog API
    pub api_key: String,
    pub api_user: String,
    /// Catalog host (`dev.example.com`) or a full base URL.
    pub catalog_host: String,
    pub account: String,
    // Source
    pub target_bucket: String,
    // Dedup store
    pub dedup_backend: DedupBackend,
    pub dedup_table: String,
    pub dedup_region: String,
    pub dedup_endpoint: Option<String>,
    pub dedup_ttl: Duration,
    // Transfer policy
    pub http_timeout: Duration,
    pub read_url_expiry: Duration,
    pub write_url_expiry: Duration,
    pub search_page_size: u32,
    pub upload_target: UploadTarget,
    // Logging
    pub log_format: LogFormat,
    pub environment: String,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_user", &self.api_user)
            .field("catalog_host", &self.catalog_host)
            .field("account", &self.account)
            .field("target_bucket", &self.target_bucket)
            .field("dedup_backend", &self.dedup_backend)
            .field("dedup_table", &self.dedup_table)
            .field("dedup_region", &self.dedup_region)
            .field("dedup_ttl", &self.dedup_ttl)
            .field("upload_target", &self.upload_target)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| anyhow::anyhow!("{} must be set", name))
        };
        let secs = |name: &str, default: u64| -> Result<Duration, anyhow::Error> {
            match var(name) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", name)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let config = RelayConfig {
            api_key: required("API_KEY")?,
            api_user: required("API_USER")?,
            catalog_host: required("GE_ENV")?,
            account: required("ACCOUNT")?,
            target_bucket: required("BUCKET")?,
            dedup_backend: var("DEDUP_BACKEND")
                .map(|v| v.parse::<DedupBackend>())
                .transpose()?
                .unwrap_or(DedupBackend::DynamoDb),
            dedup_table: var("DEDUP_TABLE").unwrap_or_else(|| constants::DEDUP_TABLE.to_string()),
            dedup_region: var("DEDUP_REGION")
                .unwrap_or_else(|| constants::DEDUP_REGION.to_string()),
            dedup_endpoint: var("DEDUP_ENDPOINT"),
            dedup_ttl: secs("DEDUP_TTL_SECS", constants::DEDUP_TTL_SECS)?,
            http_timeout: secs("HTTP_TIMEOUT_SECS", constants::HTTP_TIMEOUT_SECS)?,
            read_url_expiry: secs("READ_URL_EXPIRY_SECS", constants::READ_URL_EXPIRY_SECS)?,
            write_url_expiry: secs("WRITE_URL_EXPIRY_SECS", constants::WRITE_URL_EXPIRY_SECS)?,
            search_page_size: var("SEARCH_PAGE_SIZE")
                .map(|v| v.trim().parse::<u32>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("SEARCH_PAGE_SIZE must be a positive integer"))?
                .unwrap_or(constants::SEARCH_PAGE_SIZE),
            upload_target: var("UPLOAD_TARGET")
                .map(|v| v.parse::<UploadTarget>())
                .transpose()?
                .unwrap_or(UploadTarget::Attachment),
            log_format: var("LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(LogFormat::Json),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.dedup_ttl.is_zero() {
            return Err(anyhow::anyhow!("DEDUP_TTL_SECS must be greater than zero"));
        }
        if self.http_timeout.is_zero() {
            return Err(anyhow::anyhow!("HTTP_TIMEOUT_SECS must be greater than zero"));
        }
        // Signed URL lifetimes are capped at seven days by the object store.
        let max_expiry = Duration::from_secs(7 * 24 * 3600);
        if self.read_url_expiry.is_zero() || self.read_url_expiry > max_expiry {
            return Err(anyhow::anyhow!(
                "READ_URL_EXPIRY_SECS must be between 1 second and 7 days"
            ));
        }
        if self.write_url_expiry.is_zero() || self.write_url_expiry > max_expiry {
            return Err(anyhow::anyhow!(
                "WRITE_URL_EXPIRY_SECS must be between 1 second and 7 days"
            ));
        }
        if self.search_page_size == 0 {
            return Err(anyhow::anyhow!("SEARCH_PAGE_SIZE must be greater than zero"));
        }
        if self.catalog_host.contains("://")
            && !(self.catalog_host.starts_with("https://")
                || self.catalog_host.starts_with("http://"))
        {
            return Err(anyhow::anyhow!("GE_ENV must be a host name or an http(s) URL"));
        }
        Ok(())
    }

    /// Base URL of the catalog API, without trailing slash.
    pub fn catalog_base_url(&self) -> String {
        let host = self.catalog_host.trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("API_KEY", "key-123"),
            ("API_USER", "user-9"),
            ("GE_ENV", "dev.catalog.example.com"),
            ("ACCOUNT", "42"),
            ("BUCKET", "ingest"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<RelayConfig, anyhow::Error> {
        RelayConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_are_applied() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.dedup_backend, DedupBackend::DynamoDb);
        assert_eq!(config.dedup_table, "IngestAntiDupe");
        assert_eq!(config.dedup_region, "us-east-1");
        assert_eq!(config.dedup_ttl, Duration::from_secs(600));
        assert_eq!(config.http_timeout, Duration::from_secs(300));
        assert_eq!(config.read_url_expiry, Duration::from_secs(300));
        assert_eq!(config.write_url_expiry, Duration::from_secs(3600));
        assert_eq!(config.search_page_size, 5001);
        assert_eq!(config.upload_target, UploadTarget::Attachment);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.catalog_base_url(), "https://dev.catalog.example.com");
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let mut vars = base_vars();
        vars.remove("BUCKET");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("BUCKET"));

        let mut vars = base_vars();
        vars.insert("API_KEY", "  ");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = base_vars();
        vars.insert("GE_ENV", "http://127.0.0.1:8080/");
        vars.insert("DEDUP_BACKEND", "memory");
        vars.insert("DEDUP_TTL_SECS", "30");
        vars.insert("UPLOAD_TARGET", "Version");
        vars.insert("LOG_FORMAT", "pretty");
        let config = load(&vars).unwrap();
        assert_eq!(config.catalog_base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.dedup_backend, DedupBackend::Memory);
        assert_eq!(config.dedup_ttl, Duration::from_secs(30));
        assert_eq!(config.upload_target, UploadTarget::Version);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut vars = base_vars();
        vars.insert("DEDUP_TTL_SECS", "0");
        assert!(load(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("WRITE_URL_EXPIRY_SECS", "ten");
        assert!(load(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("DEDUP_BACKEND", "redis");
        assert!(load(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("GE_ENV", "ftp://catalog");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn debug_output_omits_api_key() {
        let config = load(&base_vars()).unwrap();
        assert!(!format!("{:?}", config).contains("key-123"));
    }
}
