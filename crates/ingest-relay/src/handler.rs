//! Lambda entry point wiring
//!
//! Process-wide state (configuration, AWS clients, dedup store) is built once
//! at cold start. Each invocation builds its own HTTP transport and the
//! components that use it, and drops them when it returns.

use crate::negotiate::UploadNegotiator;
use crate::orchestrator::{Disposition, PipelineComponents, SkipReason, TransferOrchestrator};
use crate::trigger::{trigger_from_notification, Trigger};
use anyhow::{Context, Result};
use aws_lambda_events::event::s3::S3Event;
use ingest_catalog::CatalogClient;
use ingest_core::{RelayConfig, RelayError, RelayResult};
use ingest_storage::{create_dedup_store, DedupStore, S3ObjectFetcher, SlotUrlSigner};
use lambda_runtime::LambdaEvent;
use std::sync::Arc;

/// State shared by every invocation of a warm function instance.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub s3: aws_sdk_s3::Client,
    pub dedup: Arc<dyn DedupStore>,
}

impl AppState {
    pub async fn initialize(config: RelayConfig) -> Result<Self> {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let s3 = aws_sdk_s3::Client::new(&sdk_config);
        let dedup = create_dedup_store(&config, &sdk_config)
            .context("Failed to initialize dedup store")?;

        tracing::info!(
            target_bucket = %config.target_bucket,
            dedup_backend = %config.dedup_backend,
            upload_target = %config.upload_target,
            environment = %config.environment,
            "Relay initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            s3,
            dedup,
        })
    }

    /// Transport for a single invocation.
    pub fn invocation_transport(&self) -> RelayResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.config.http_timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Build the pipeline for one invocation around `http`.
    pub fn orchestrator(&self, http: reqwest::Client) -> TransferOrchestrator {
        let config = &self.config;
        let catalog = Arc::new(CatalogClient::from_config(http.clone(), config));
        let fetcher = Arc::new(S3ObjectFetcher::new(
            self.s3.clone(),
            http.clone(),
            config.read_url_expiry,
        ));
        let signer = Arc::new(SlotUrlSigner::new(config.write_url_expiry));
        let negotiator = UploadNegotiator::new(catalog.clone(), signer, config.upload_target);

        TransferOrchestrator::new(
            PipelineComponents {
                dedup: self.dedup.clone(),
                catalog,
                fetcher,
                negotiator,
                http,
            },
            config.target_bucket.clone(),
            config.dedup_ttl,
        )
    }
}

/// Handle one S3 notification.
pub async fn handle_notification(
    state: &AppState,
    event: LambdaEvent<S3Event>,
) -> Result<Disposition, lambda_runtime::Error> {
    let (notification, context) = event.into_parts();

    match serde_json::to_string(&notification) {
        Ok(raw) => tracing::debug!(
            request_id = %context.request_id,
            event = %raw,
            "Received notification"
        ),
        Err(e) => tracing::debug!(
            request_id = %context.request_id,
            error = %e,
            "Received notification that could not be echoed"
        ),
    }

    let trigger = trigger_from_notification(&notification, &state.config.target_bucket)?;
    let ingest_event = match trigger {
        Trigger::Ingest(ingest_event) => ingest_event,
        Trigger::ForeignBucket(bucket) => {
            tracing::info!(
                expected = %state.config.target_bucket,
                bucket = ?bucket,
                "Skipped: bucket name mismatch"
            );
            return Ok(Disposition::Skipped {
                reason: SkipReason::BucketMismatch,
            });
        }
    };
    let http = state.invocation_transport()?;
    let disposition = state.orchestrator(http).run(&ingest_event).await?;

    Ok(disposition)
}

/// Call the catalog's current-user endpoint with the configured credentials.
pub async fn verify_catalog_credentials(state: &AppState) -> RelayResult<serde_json::Value> {
    let http = state.invocation_transport()?;
    let client = CatalogClient::from_config(http, &state.config);
    let me = client.current_user().await?;
    tracing::info!(
        user = %me.get("id").map(|v| v.to_string()).unwrap_or_default(),
        "Catalog credentials accepted"
    );
    Ok(me)
}
