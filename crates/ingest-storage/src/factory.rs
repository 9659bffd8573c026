#[cfg(feature = "dedup-dynamodb")]
use crate::{DynamoDedupConfig, DynamoDedupStore};
use crate::{DedupStore, MemoryDedupStore};
#[cfg(not(feature = "dedup-dynamodb"))]
use ingest_core::RelayError;
use ingest_core::{DedupBackend, RelayConfig, RelayResult};
use std::sync::Arc;

/// Create the dedup store selected by configuration
#[cfg(feature = "dedup-dynamodb")]
pub fn create_dedup_store(
    config: &RelayConfig,
    sdk_config: &aws_config::SdkConfig,
) -> RelayResult<Arc<dyn DedupStore>> {
    match config.dedup_backend {
        DedupBackend::DynamoDb => {
            let store = DynamoDedupStore::new(
                sdk_config,
                DynamoDedupConfig {
                    table_name: config.dedup_table.clone(),
                    region: Some(config.dedup_region.clone()),
                    endpoint: config.dedup_endpoint.clone(),
                    timeout: Some(config.http_timeout),
                },
            );
            tracing::info!(
                table = %config.dedup_table,
                region = %config.dedup_region,
                "Using DynamoDB dedup store"
            );
            Ok(Arc::new(store))
        }
        DedupBackend::Memory => memory_store(),
    }
}

/// Create the dedup store selected by configuration
#[cfg(not(feature = "dedup-dynamodb"))]
pub fn create_dedup_store(config: &RelayConfig) -> RelayResult<Arc<dyn DedupStore>> {
    match config.dedup_backend {
        DedupBackend::DynamoDb => Err(RelayError::Config(
            "DynamoDB dedup backend not available (dedup-dynamodb feature not enabled)"
                .to_string(),
        )),
        DedupBackend::Memory => memory_store(),
    }
}

fn memory_store() -> RelayResult<Arc<dyn DedupStore>> {
    tracing::warn!("Using in-memory dedup store; entries do not survive the process");
    Ok(Arc::new(MemoryDedupStore::new()))
}
