//! Staged upload negotiation: reserve a slot on the matched asset, then sign
//! a write URL for the slot's destination with the slot's own credentials.

use ingest_catalog::Catalog;
use ingest_core::models::{CatalogAsset, UploadSlot};
use ingest_core::{RelayResult, UploadTarget};
use ingest_storage::WriteUrlSigner;
use std::sync::Arc;

/// A reserved slot and the URL the bytes must be PUT to.
#[derive(Debug, Clone)]
pub struct NegotiatedUpload {
    pub slot: UploadSlot,
    pub write_url: String,
}

#[derive(Clone)]
pub struct UploadNegotiator {
    catalog: Arc<dyn Catalog>,
    signer: Arc<dyn WriteUrlSigner>,
    target: UploadTarget,
}

impl UploadNegotiator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        signer: Arc<dyn WriteUrlSigner>,
        target: UploadTarget,
    ) -> Self {
        Self {
            catalog,
            signer,
            target,
        }
    }

    /// Reserve a slot for `file_name` on `asset` and sign its write URL.
    ///
    /// `content_type` is bound into the URL signature and must be sent
    /// unchanged with the PUT.
    pub async fn negotiate(
        &self,
        file_name: &str,
        file_size: u64,
        asset: &CatalogAsset,
        content_type: &str,
    ) -> RelayResult<NegotiatedUpload> {
        let slot = match self.target {
            UploadTarget::Attachment => {
                self.catalog
                    .initiate_upload(file_name, file_size, &asset.id, &asset.workspace_id)
                    .await?
            }
            UploadTarget::Version => {
                let summary = self
                    .catalog
                    .asset_summary(&asset.id, &asset.workspace_id)
                    .await?;
                self.catalog
                    .initiate_version_upload(&summary, file_name, file_size)
                    .await?
            }
        };

        let write_url = self.signer.build_write_url(&slot, content_type).await?;

        Ok(NegotiatedUpload { slot, write_url })
    }
}
