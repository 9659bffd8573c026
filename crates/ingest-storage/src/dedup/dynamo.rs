//! DynamoDB-backed dedup store.
//!
//! Table layout: partition key `EventETag` (S), expiry `Expires` (N, unix
//! seconds). The table's TTL setting should point at `Expires`.

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use aws_smithy_types::timeout::TimeoutConfig;
use chrono::Utc;
use ingest_core::constants::{DEDUP_EXPIRES_ATTR, DEDUP_KEY_ATTR};
use ingest_core::models::DedupEntry;
use ingest_core::{DedupBackend, RelayError, RelayResult, Stage};
use std::collections::HashMap;
use std::time::Duration;

use super::DedupStore;

/// DynamoDB dedup store configuration
#[derive(Debug, Clone)]
pub struct DynamoDedupConfig {
    pub table_name: String,
    /// Region override; the SDK default is used when unset.
    pub region: Option<String>,
    /// Endpoint override (e.g. LocalStack)
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct DynamoDedupStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoDedupStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoDedupStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoDedupStore {
    pub fn new(sdk_config: &aws_config::SdkConfig, config: DynamoDedupConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }

        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        if let Some(timeout) = config.timeout {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(timeout)
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name: config.table_name,
        }
    }

    /// Create from a pre-built client
    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn item_to_entry(fingerprint: &str, item: &HashMap<String, AttributeValue>) -> DedupEntry {
        let expires_at = item
            .get(DEDUP_EXPIRES_ATTR)
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok());

        match expires_at {
            Some(expires_at) => DedupEntry {
                fingerprint: fingerprint.to_string(),
                expires_at,
            },
            None => {
                // Rows without an expiry never age out of the table either.
                tracing::warn!(
                    fingerprint = %fingerprint,
                    "Dedup row has no readable expiry; treating it as permanent"
                );
                DedupEntry {
                    fingerprint: fingerprint.to_string(),
                    expires_at: i64::MAX,
                }
            }
        }
    }
}

#[async_trait]
impl DedupStore for DynamoDedupStore {
    async fn lookup(&self, fingerprint: &str) -> RelayResult<Option<DedupEntry>> {
        let start = std::time::Instant::now();

        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(DEDUP_KEY_ATTR, AttributeValue::S(fingerprint.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    table = %self.table_name,
                    fingerprint = %fingerprint,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Dedup lookup failed"
                );
                RelayError::transport(Stage::DedupLookup, DisplayErrorContext(&e))
            })?;

        let entry = output
            .item()
            .map(|item| Self::item_to_entry(fingerprint, item));

        tracing::debug!(
            table = %self.table_name,
            fingerprint = %fingerprint,
            found = entry.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dedup lookup complete"
        );

        Ok(entry)
    }

    async fn record(&self, fingerprint: &str, ttl: Duration) -> RelayResult<DedupEntry> {
        let start = std::time::Instant::now();
        let entry = DedupEntry::expiring_after(fingerprint, ttl, Utc::now());

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item(DEDUP_KEY_ATTR, AttributeValue::S(entry.fingerprint.clone()))
            .item(
                DEDUP_EXPIRES_ATTR,
                AttributeValue::N(entry.expires_at.to_string()),
            )
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    table = %self.table_name,
                    fingerprint = %fingerprint,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Dedup record failed"
                );
                RelayError::transport(Stage::DedupRecord, DisplayErrorContext(&e))
            })?;

        tracing::info!(
            table = %self.table_name,
            fingerprint = %entry.fingerprint,
            expires_at = entry.expires_at,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dedup entry recorded"
        );

        Ok(entry)
    }

    fn backend_type(&self) -> DedupBackend {
        DedupBackend::DynamoDb
    }
}
