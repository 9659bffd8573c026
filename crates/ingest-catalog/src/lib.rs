//! HTTP client for the catalog API.
//!
//! Provides [`CatalogClient`], a thin reqwest-based caller that attaches the
//! two static auth headers to every request, and the [`Catalog`] trait the
//! pipeline depends on. Domain methods (search, upload slots, asset summary)
//! live in [`api`].

pub mod api;

use async_trait::async_trait;
use ingest_core::constants::{CATALOG_API_KEY_HEADER, CATALOG_API_PREFIX, CATALOG_USER_HEADER};
use ingest_core::models::{AssetSummary, SearchResult, UploadSlot};
use ingest_core::{RelayConfig, RelayError, RelayResult, Stage};
use serde::de::DeserializeOwned;

pub use api::search_expression;

/// Catalog operations used by the transfer pipeline.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Search assets by name. A zero count is a normal result.
    async fn search(&self, query: &str) -> RelayResult<SearchResult>;

    /// Reserve an attachment upload slot on an asset.
    async fn initiate_upload(
        &self,
        file_name: &str,
        file_size: u64,
        asset_id: &str,
        workspace_id: &str,
    ) -> RelayResult<UploadSlot>;

    /// Fetch the details needed to upload a new version of an asset.
    async fn asset_summary(&self, asset_id: &str, workspace_id: &str) -> RelayResult<AssetSummary>;

    /// Reserve a version upload slot on an asset.
    async fn initiate_version_upload(
        &self,
        summary: &AssetSummary,
        file_name: &str,
        file_size: u64,
    ) -> RelayResult<UploadSlot>;
}

/// Static catalog credentials sent with every request.
#[derive(Clone)]
pub struct CatalogCredentials {
    pub api_key: String,
    pub user_id: String,
}

impl std::fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("api_key", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// HTTP client for the catalog API.
///
/// Holds a clone of the caller's `reqwest::Client`; it does not own a
/// connection pool of its own.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    account: String,
    credentials: CatalogCredentials,
    search_page_size: u32,
}

impl CatalogClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        account: impl Into<String>,
        credentials: CatalogCredentials,
        search_page_size: u32,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account: account.into(),
            credentials,
            search_page_size,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &RelayConfig) -> Self {
        Self::new(
            client,
            config.catalog_base_url(),
            config.account.clone(),
            CatalogCredentials {
                api_key: config.api_key.clone(),
                user_id: config.api_user.clone(),
            },
            config.search_page_size,
        )
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn search_page_size(&self) -> u32 {
        self.search_page_size
    }

    /// Absolute URL for an API path (without the version prefix).
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, CATALOG_API_PREFIX, path)
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(CATALOG_API_KEY_HEADER, self.credentials.api_key.as_str())
            .header(CATALOG_USER_HEADER, self.credentials.user_id.as_str())
    }

    /// Send an authenticated request and deserialize its JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        request: reqwest::RequestBuilder,
    ) -> RelayResult<T> {
        let start = std::time::Instant::now();
        let request = self.apply_auth(request);

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::transport(stage, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::transport(stage, e))?;

        if !status.is_success() {
            tracing::debug!(
                stage = %stage,
                status = status.as_u16(),
                body = %text,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Catalog request failed"
            );
            return Err(RelayError::HttpStatus {
                stage,
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::debug!(
            stage = %stage,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Catalog request complete"
        );

        serde_json::from_str(&text).map_err(|e| RelayError::structural(stage, e))
    }
}
