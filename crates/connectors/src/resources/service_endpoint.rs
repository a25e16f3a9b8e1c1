use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub id: Option<String>,
    pub name: Option<String>,
    pub is_ready: Option<bool>,
    pub is_shared: Option<bool>,
    pub description: Option<String>,
    pub owner: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub administrators_group: Option<Value>,
    pub authorization: Option<Value>,
    pub created_by: Option<Value>,
    pub data: Option<Value>,
    pub operation_status: Option<Value>,
    pub readers_group: Option<Value>,
    pub service_endpoint_project_references: Option<Value>,
}
