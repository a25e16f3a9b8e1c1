use super::serde_helpers;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub dashboard_scope: Option<String>,
    pub group_id: Option<String>,
    pub owner_id: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "eTag")]
    pub etag: Option<String>,
    pub position: Option<i64>,
    pub refresh_interval: Option<i64>,
    pub url: Option<String>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
    pub widgets: Option<Value>,
}
