//! Source object fetcher
//!
//! Opens an object in the source bucket as a lazily-read byte stream. Only
//! the response headers are awaited; the body is consumed later, once, by
//! whoever copies it to the destination.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use ingest_core::constants::FALLBACK_CONTENT_TYPE;
use ingest_core::{RelayError, RelayResult, Stage};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::io;
use std::pin::Pin;

/// Single-pass byte stream. Not seekable, not restartable.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// An opened source object: its unread body plus the metadata its store declared.
pub struct SourceObject {
    pub body: ByteStream,
    pub content_length: u64,
    pub content_type: String,
}

impl std::fmt::Debug for SourceObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceObject")
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Open `key` in `bucket` for reading.
    ///
    /// `key` is storage-encoded, exactly as it arrived in the trigger event.
    async fn open_readable(&self, bucket: &str, key: &str) -> RelayResult<SourceObject>;
}

/// GET a signed URL and return the response body unread.
pub async fn open_signed_url(http: &reqwest::Client, url: &str) -> RelayResult<SourceObject> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| RelayError::transport(Stage::Fetch, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(RelayError::HttpStatus {
            stage: Stage::Fetch,
            status: status.as_u16(),
            body,
        });
    }

    let content_length = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .or_else(|| response.content_length())
        .ok_or_else(|| {
            RelayError::structural(Stage::Fetch, "source response has no Content-Length")
        })?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));

    Ok(SourceObject {
        body: Box::pin(body),
        content_length,
        content_type,
    })
}

#[cfg(feature = "object-s3")]
pub use s3::S3ObjectFetcher;

#[cfg(feature = "object-s3")]
mod s3 {
    use super::*;
    use aws_sdk_s3::error::DisplayErrorContext;
    use aws_sdk_s3::presigning::PresigningConfig;
    use aws_sdk_s3::Client;
    use ingest_core::decode_object_key;
    use std::time::Duration;

    /// Fetches source objects through short-lived presigned GET URLs.
    #[derive(Clone)]
    pub struct S3ObjectFetcher {
        client: Client,
        http: reqwest::Client,
        read_url_expiry: Duration,
    }

    impl S3ObjectFetcher {
        /// `http` is the invocation's transport; the fetcher holds it only as
        /// long as the invocation holds the fetcher.
        pub fn new(client: Client, http: reqwest::Client, read_url_expiry: Duration) -> Self {
            Self {
                client,
                http,
                read_url_expiry,
            }
        }

        /// Presign a GET for an already-decoded key.
        pub async fn presign_read_url(&self, bucket: &str, key: &str) -> RelayResult<String> {
            let presigning_config = PresigningConfig::expires_in(self.read_url_expiry)
                .map_err(|e| RelayError::structural(Stage::Fetch, e))?;

            let presigned_request = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(presigning_config)
                .await
                .map_err(|e| RelayError::transport(Stage::Fetch, DisplayErrorContext(&e)))?;

            Ok(presigned_request.uri().to_string())
        }
    }

    #[async_trait]
    impl ObjectFetcher for S3ObjectFetcher {
        async fn open_readable(&self, bucket: &str, key: &str) -> RelayResult<SourceObject> {
            let start = std::time::Instant::now();
            let decoded_key = decode_object_key(key);

            let url = self.presign_read_url(bucket, &decoded_key).await?;
            let source = open_signed_url(&self.http, &url).await.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %decoded_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Source object fetch failed"
                );
                e
            })?;

            tracing::info!(
                bucket = %bucket,
                key = %decoded_key,
                size_bytes = source.content_length,
                content_type = %source.content_type,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Source object opened"
            );

            Ok(source)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn signed_url_body_is_streamed_with_declared_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ingest/photo.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body("hello world")
            .create_async()
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/ingest/photo.jpg", server.url());
        let mut source = open_signed_url(&http, &url).await.unwrap();

        assert_eq!(source.content_length, 11);
        assert_eq!(source.content_type, "image/jpeg");

        let mut collected = Vec::new();
        while let Some(chunk) = source.body.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"hello world");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.jpg")
            .with_status(404)
            .with_body("NoSuchKey")
            .create_async()
            .await;

        let err = open_signed_url(
            &reqwest::Client::new(),
            &format!("{}/gone.jpg", server.url()),
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Fetch));
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("NoSuchKey"));
    }

    #[tokio::test]
    async fn response_without_length_is_structural() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/chunked.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_chunked_body(|w| w.write_all(b"hello world"))
            .create_async()
            .await;

        let err = open_signed_url(
            &reqwest::Client::new(),
            &format!("{}/chunked.jpg", server.url()),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RelayError::Structural {
                stage: Stage::Fetch,
                ..
            }
        ));
    }
}
