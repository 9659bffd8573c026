//! Streaming PUT of a source object to a signed destination URL.

use ingest_core::models::TransferOutcome;
use ingest_core::{RelayError, RelayResult, Stage};
use ingest_storage::SourceObject;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

/// Copy `source` to `write_url` in a single pass.
///
/// The body is forwarded chunk by chunk as the source yields it; nothing is
/// buffered beyond what the transport holds in flight. Length and type are
/// the values the source declared.
pub async fn stream_to_url(
    http: &reqwest::Client,
    write_url: &str,
    source: SourceObject,
) -> RelayResult<TransferOutcome> {
    let start = std::time::Instant::now();
    let SourceObject {
        body,
        content_length,
        content_type,
    } = source;

    let response = http
        .put(write_url)
        .header(CONTENT_TYPE, content_type.as_str())
        .header(CONTENT_LENGTH, content_length)
        .body(reqwest::Body::wrap_stream(body))
        .send()
        .await
        .map_err(|e| RelayError::transport(Stage::Upload, e))?;

    let status = response.status();
    let detail = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    if !status.is_success() {
        return Err(RelayError::HttpStatus {
            stage: Stage::Upload,
            status: status.as_u16(),
            body: detail,
        });
    }

    tracing::info!(
        status = status.as_u16(),
        size_bytes = content_length,
        content_type = %content_type,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Object streamed to destination"
    );

    Ok(TransferOutcome::from_status(status.as_u16(), detail))
}
