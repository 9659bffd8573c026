//! Destination write-URL signing
//!
//! An upload slot carries temporary credentials scoped to one destination
//! object. Signing happens locally; no request is sent.

use async_trait::async_trait;
use ingest_core::models::UploadSlot;
use ingest_core::RelayResult;

#[async_trait]
pub trait WriteUrlSigner: Send + Sync {
    /// Build a signed PUT URL for the slot's destination.
    ///
    /// `content_type` is bound into the signature: the eventual PUT must send
    /// exactly this `Content-Type`.
    async fn build_write_url(&self, slot: &UploadSlot, content_type: &str) -> RelayResult<String>;
}

#[cfg(feature = "object-s3")]
pub use s3::SlotUrlSigner;

#[cfg(feature = "object-s3")]
mod s3 {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_s3::error::DisplayErrorContext;
    use aws_sdk_s3::presigning::PresigningConfig;
    use aws_sdk_s3::Client;
    use ingest_core::{RelayError, Stage};
    use std::time::Duration;

    /// Signs slot destinations with the slot's own temporary credentials.
    #[derive(Debug, Clone)]
    pub struct SlotUrlSigner {
        expires_in: Duration,
    }

    impl SlotUrlSigner {
        pub fn new(expires_in: Duration) -> Self {
            Self { expires_in }
        }

        /// Client that lives for a single signature.
        fn slot_client(slot: &UploadSlot) -> Client {
            let credentials = Credentials::new(
                slot.credentials.access_key.clone(),
                slot.credentials.secret_key.clone(),
                Some(slot.credentials.session_token.clone()),
                None,
                "upload-slot",
            );
            let config = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(slot.credentials.region.clone()))
                .credentials_provider(credentials)
                .build();
            Client::from_conf(config)
        }
    }

    #[async_trait]
    impl WriteUrlSigner for SlotUrlSigner {
        async fn build_write_url(
            &self,
            slot: &UploadSlot,
            content_type: &str,
        ) -> RelayResult<String> {
            let presigning_config = PresigningConfig::expires_in(self.expires_in)
                .map_err(|e| RelayError::structural(Stage::SignWriteUrl, e))?;

            let client = Self::slot_client(slot);
            let presigned_request = client
                .put_object()
                .bucket(&slot.destination_bucket)
                .key(&slot.destination_key)
                .content_type(content_type)
                .presigned(presigning_config)
                .await
                .map_err(|e| {
                    RelayError::structural(Stage::SignWriteUrl, DisplayErrorContext(&e))
                })?;

            tracing::debug!(
                bucket = %slot.destination_bucket,
                key = %slot.destination_key,
                region = %slot.credentials.region,
                content_type = %content_type,
                expires_in_secs = self.expires_in.as_secs(),
                "Signed destination write URL"
            );

            Ok(presigned_request.uri().to_string())
        }
    }

}
