use super::serde_helpers;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub folder: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub revision: Option<String>,
    pub url: Option<String>,
    pub configuration: Option<PipelineConfiguration>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfiguration {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}
