use super::{EntityRef, serde_helpers};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepository {
    pub id: Option<String>,
    pub name: Option<String>,
    pub default_branch: Option<String>,
    pub is_fork: Option<bool>,
    pub project: Option<EntityRef>,
    pub remote_url: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub size: Option<String>,
    pub ssh_url: Option<String>,
    pub url: Option<String>,
    pub web_url: Option<String>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
    pub parent_repository: Option<Value>,
    pub valid_remote_urls: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBranchStats {
    pub name: Option<String>,
    pub ahead_count: Option<i64>,
    pub behind_count: Option<i64>,
    pub is_base_version: Option<bool>,
    pub commit: Option<Value>,
}
