//! Transfer orchestration
//!
//! One invocation walks a single linear path:
//!
//! ```text
//! Start -> DedupChecked -> Searched -> Fetched -> SlotNegotiated -> Streaming -> DedupRecorded
//! ```
//!
//! Three exits are skips and leave no trace: the event names another bucket,
//! the fingerprint has a live dedup entry, or the catalog has no match. Any
//! other failure aborts the run and is returned to the caller; nothing after
//! the failing step is attempted. The dedup entry is written only after the
//! destination accepted the PUT.

use crate::negotiate::UploadNegotiator;
use crate::upload::stream_to_url;
use chrono::Utc;
use ingest_catalog::Catalog;
use ingest_core::models::{IngestEvent, TransferOutcome};
use ingest_core::{LogLevel, RelayError, RelayResult, Stage};
use ingest_storage::{DedupStore, ObjectFetcher};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Why an event was dropped without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BucketMismatch,
    Duplicate,
    NoMatch,
}

/// How an invocation ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    Skipped { reason: SkipReason },
    Transferred { outcome: TransferOutcome },
}

impl Disposition {
    fn skipped(reason: SkipReason) -> Self {
        Disposition::Skipped { reason }
    }
}

/// Collaborators of one pipeline run.
#[derive(Clone)]
pub struct PipelineComponents {
    pub dedup: Arc<dyn DedupStore>,
    pub catalog: Arc<dyn Catalog>,
    pub fetcher: Arc<dyn ObjectFetcher>,
    pub negotiator: UploadNegotiator,
    /// Transport for the destination PUT.
    pub http: reqwest::Client,
}

#[derive(Clone)]
pub struct TransferOrchestrator {
    components: PipelineComponents,
    target_bucket: String,
    dedup_ttl: Duration,
}

impl TransferOrchestrator {
    pub fn new(
        components: PipelineComponents,
        target_bucket: impl Into<String>,
        dedup_ttl: Duration,
    ) -> Self {
        Self {
            components,
            target_bucket: target_bucket.into(),
            dedup_ttl,
        }
    }

    /// Run the pipeline for one event.
    #[instrument(
        skip(self, event),
        fields(
            bucket = %event.bucket_name(),
            key = %event.object_key(),
            fingerprint = %event.fingerprint()
        )
    )]
    pub async fn run(&self, event: &IngestEvent) -> RelayResult<Disposition> {
        let start = std::time::Instant::now();
        let result = self.transfer(event).await;

        match &result {
            Ok(Disposition::Transferred { outcome }) => {
                tracing::info!(
                    status = outcome.http_status,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Finished transfer"
                );
            }
            Ok(Disposition::Skipped { .. }) => {}
            Err(e) => report_failure(e, event, start),
        }

        result
    }

    async fn transfer(&self, event: &IngestEvent) -> RelayResult<Disposition> {
        let PipelineComponents {
            dedup,
            catalog,
            fetcher,
            negotiator,
            http,
        } = &self.components;

        if event.bucket_name() != self.target_bucket {
            tracing::info!(
                expected = %self.target_bucket,
                "Skipped: bucket name mismatch"
            );
            return Ok(Disposition::skipped(SkipReason::BucketMismatch));
        }

        // DedupChecked
        if let Some(entry) = dedup.lookup(event.fingerprint()).await? {
            if !entry.is_expired_at(Utc::now()) {
                tracing::info!(
                    expires_at = entry.expires_at,
                    "Skipped: duplicate fingerprint"
                );
                return Ok(Disposition::skipped(SkipReason::Duplicate));
            }
            tracing::debug!(
                expires_at = entry.expires_at,
                "Dedup entry has expired; processing again"
            );
        }

        // Searched
        let query = event.search_query();
        if query.trim().is_empty() {
            tracing::info!("Skipped: object key has no file name to search for");
            return Ok(Disposition::skipped(SkipReason::NoMatch));
        }
        let result = catalog.search(&query).await?;
        if result.is_empty() {
            tracing::info!(query = %query, "Skipped: search returned 0 assets");
            return Ok(Disposition::skipped(SkipReason::NoMatch));
        }
        let asset = result.first_ranked_match().ok_or_else(|| {
            RelayError::structural(
                Stage::Search,
                format!("search reported {} hits but returned no assets", result.count),
            )
        })?;
        tracing::debug!(
            asset_id = %asset.id,
            workspace_id = %asset.workspace_id,
            count = result.count,
            "Selected first-ranked match"
        );

        // Fetched
        let source = fetcher
            .open_readable(event.bucket_name(), event.object_key())
            .await?;

        // SlotNegotiated
        let file_name = event.decoded_key();
        let upload = negotiator
            .negotiate(
                &file_name,
                source.content_length,
                asset,
                &source.content_type,
            )
            .await?;

        // Streaming
        let outcome = stream_to_url(http, &upload.write_url, source).await?;

        // DedupRecorded
        dedup.record(event.fingerprint(), self.dedup_ttl).await?;

        Ok(Disposition::Transferred { outcome })
    }
}

fn report_failure(error: &RelayError, event: &IngestEvent, start: std::time::Instant) {
    let stage = error.stage().map(|s| s.as_str()).unwrap_or("config");
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match error.log_level() {
        LogLevel::Warn => tracing::warn!(
            error = %error,
            stage = %stage,
            status = ?error.status(),
            bucket = %event.bucket_name(),
            key = %event.object_key(),
            duration_ms,
            "Transfer failed"
        ),
        LogLevel::Error => tracing::error!(
            error = %error,
            stage = %stage,
            status = ?error.status(),
            bucket = %event.bucket_name(),
            key = %event.object_key(),
            duration_ms,
            "Transfer failed"
        ),
    }
}
