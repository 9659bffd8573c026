//! Domain methods for the catalog client.

use crate::{Catalog, CatalogClient};
use async_trait::async_trait;
use ingest_core::models::{AssetSummary, SearchResult, UploadSlot};
use ingest_core::{RelayResult, Stage};
use serde_json::{json, Value};

/// Build the catalog search expression for an asset name.
///
/// Names are matched on the `name` field only, all terms required, best
/// score first. The expression is itself parameter-encoded, so `%` and `&`
/// in the name are escaped; other characters, including the search syntax
/// operators, pass through unchanged.
pub fn search_expression(name: &str, page_size: u32) -> String {
    let name = name.replace('%', "%25").replace('&', "%26");
    format!(
        "search={}&searchMode=all&$searchFields=name&$orderby=search.score()%20desc&$top={}&$skip=0",
        name, page_size
    )
}

/// Workspace ids are numeric on this endpoint; fall back to the raw string.
fn workspace_id_value(workspace_id: &str) -> Value {
    workspace_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(workspace_id))
}

impl CatalogClient {
    /// Identity the configured credentials resolve to.
    pub async fn current_user(&self) -> RelayResult<Value> {
        let request = self.client().get(self.build_url("/users/me"));
        self.send_json(Stage::CurrentUser, request).await
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn search(&self, query: &str) -> RelayResult<SearchResult> {
        let url = self.build_url(&format!(
            "/accounts/{}/search/assets",
            urlencoding::encode(self.account())
        ));
        let body = json!({
            "query": search_expression(query, self.search_page_size()),
            "searchType": "workspace",
        });

        let result: SearchResult = self
            .send_json(Stage::Search, self.client().post(url).json(&body))
            .await?;

        tracing::info!(
            query = %query,
            count = result.count,
            returned = result.assets.len(),
            "Catalog search complete"
        );

        Ok(result)
    }

    async fn initiate_upload(
        &self,
        file_name: &str,
        file_size: u64,
        asset_id: &str,
        workspace_id: &str,
    ) -> RelayResult<UploadSlot> {
        let url = self.build_url(&format!(
            "/assets/{}/attachments",
            urlencoding::encode(asset_id)
        ));
        let body = json!({
            "upload": {
                "fileName": file_name,
                "fileSize": file_size,
            }
        });
        let request = self
            .client()
            .post(url)
            .query(&[("scopeType", "workspace"), ("scopeId", workspace_id)])
            .json(&body);

        let slot: UploadSlot = self.send_json(Stage::InitiateUpload, request).await?;

        tracing::info!(
            asset_id = %asset_id,
            workspace_id = %workspace_id,
            file_name = %file_name,
            size_bytes = file_size,
            destination_bucket = %slot.destination_bucket,
            destination_key = %slot.destination_key,
            "Attachment upload slot reserved"
        );

        Ok(slot)
    }

    async fn asset_summary(&self, asset_id: &str, workspace_id: &str) -> RelayResult<AssetSummary> {
        let url = self.build_url(&format!(
            "/assets/{}/summary",
            urlencoding::encode(asset_id)
        ));
        let request = self
            .client()
            .get(url)
            .query(&[("scopeType", "workspace"), ("scopeId", workspace_id)]);

        self.send_json(Stage::AssetSummary, request).await
    }

    async fn initiate_version_upload(
        &self,
        summary: &AssetSummary,
        file_name: &str,
        file_size: u64,
    ) -> RelayResult<UploadSlot> {
        let url = self.build_url(&format!(
            "/assets/{}/versions",
            urlencoding::encode(&summary.id)
        ));
        let body = json!({
            "workspaceId": workspace_id_value(&summary.workspace_id),
            "workspaceName": summary.workspace_name,
            "upload": {
                "fileName": file_name,
                "fileSize": file_size,
            }
        });
        let request = self
            .client()
            .post(url)
            .query(&[
                ("scopeType", "workspace"),
                ("scopeId", summary.workspace_id.as_str()),
                ("folderId", summary.folder_id.as_str()),
            ])
            .json(&body);

        let slot: UploadSlot = self.send_json(Stage::InitiateUpload, request).await?;

        tracing::info!(
            asset_id = %summary.id,
            folder_id = %summary.folder_id,
            file_name = %file_name,
            size_bytes = file_size,
            destination_key = %slot.destination_key,
            "Version upload slot reserved"
        );

        Ok(slot)
    }
}
