use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog ids are sometimes numbers and sometimes strings on the wire.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn count_value<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("invalid count {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid count {:?}", s))),
        other => Err(de::Error::custom(format!("expected count, got {}", other))),
    }
}

/// A catalog record an object can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAsset {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub workspace_id: String,
}

/// Search response. The asset list keeps the catalog's relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(deserialize_with = "count_value")]
    pub count: u64,
    #[serde(default)]
    pub assets: Vec<CatalogAsset>,
}

impl SearchResult {
    /// First-ranked match: the head of the catalog's own ordering, never re-sorted.
    ///
    /// `None` when the catalog reported no hits.
    pub fn first_ranked_match(&self) -> Option<&CatalogAsset> {
        if self.count < 1 {
            return None;
        }
        self.assets.first()
    }

    pub fn is_empty(&self) -> bool {
        self.count < 1
    }
}

#[derive(Debug, Deserialize)]
struct Ancestor {
    #[serde(rename = "folderId", deserialize_with = "id_string")]
    folder_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssetSummary {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(deserialize_with = "id_string")]
    workspace_id: String,
    workspace_name: String,
    #[serde(default)]
    ancestry: Vec<Ancestor>,
}

/// Asset details needed to reserve a version slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssetSummary")]
pub struct AssetSummary {
    pub id: String,
    pub workspace_id: String,
    pub workspace_name: String,
    /// Innermost folder holding the asset.
    pub folder_id: String,
}

impl TryFrom<RawAssetSummary> for AssetSummary {
    type Error = String;

    fn try_from(raw: RawAssetSummary) -> Result<Self, Self::Error> {
        let folder_id = raw
            .ancestry
            .into_iter()
            .next()
            .map(|a| a.folder_id)
            .ok_or_else(|| "asset summary has no ancestry".to_string())?;
        Ok(Self {
            id: raw.id,
            workspace_id: raw.workspace_id,
            workspace_name: raw.workspace_name,
            folder_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_result_accepts_numeric_and_string_fields() {
        let result: SearchResult = serde_json::from_value(json!({
            "count": "2",
            "assets": [
                {"id": 17, "workspaceId": 4, "name": "photo 1"},
                {"id": "18", "workspaceId": "4"}
            ]
        }))
        .unwrap();

        assert_eq!(result.count, 2);
        let first = result.first_ranked_match().unwrap();
        assert_eq!(first.id, "17");
        assert_eq!(first.workspace_id, "4");
    }

    #[test]
    fn zero_count_has_no_match() {
        let result: SearchResult = serde_json::from_value(json!({"count": 0})).unwrap();
        assert!(result.is_empty());
        assert!(result.first_ranked_match().is_none());
    }

    #[test]
    fn missing_count_is_rejected() {
        let parsed = serde_json::from_value::<SearchResult>(json!({"assets": []}));
        assert!(parsed.is_err());
    }

    #[test]
    fn summary_takes_first_ancestor() {
        let summary: AssetSummary = serde_json::from_value(json!({
            "id": "a-1",
            "workspaceId": 1234,
            "workspaceName": "Spring Catalog",
            "ancestry": [{"folderId": "f-inner"}, {"folderId": "f-outer"}]
        }))
        .unwrap();
        assert_eq!(summary.workspace_id, "1234");
        assert_eq!(summary.folder_id, "f-inner");

        let orphan = serde_json::from_value::<AssetSummary>(json!({
            "id": "a-1",
            "workspaceId": 1,
            "workspaceName": "w",
            "ancestry": []
        }));
        assert!(orphan.is_err());
    }
}
