use ingest_core::RelayConfig;
use ingest_relay::handler::{handle_notification, verify_catalog_credentials, AppState};
use ingest_relay::telemetry;
use lambda_runtime::{service_fn, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    telemetry::init_telemetry(config.log_format, &config.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let state = AppState::initialize(config).await?;

    if let Err(e) = verify_catalog_credentials(&state).await {
        tracing::warn!(error = %e, "Catalog credential check failed");
    }

    let state = &state;
    let result = lambda_runtime::run(service_fn(move |event: LambdaEvent<_>| async move {
        handle_notification(state, event).await
    }))
    .await;

    telemetry::shutdown_telemetry().await;

    result.map_err(|e| anyhow::anyhow!("Lambda runtime exited: {}", e))
}
