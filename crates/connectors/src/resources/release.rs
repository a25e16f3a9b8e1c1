use super::{EntityRef, serde_helpers};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub project_reference: Option<EntityRef>,
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    pub definition_snapshot_revision: Option<i64>,
    pub description: Option<String>,
    pub keep_forever: Option<bool>,
    pub logs_container_url: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
    pub pool_name: Option<String>,
    pub reason: Option<String>,
    pub release_definition_revision: Option<i64>,
    pub release_name_format: Option<String>,
    pub triggering_artifact_alias: Option<String>,
    pub artifacts: Option<Value>,
    pub created_by: Option<Value>,
    pub created_for: Option<Value>,
    pub environments: Option<Value>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
    pub modified_by: Option<Value>,
    pub properties: Option<Value>,
    pub release_definition: Option<Value>,
    pub tags: Option<Value>,
    pub variable_groups: Option<Value>,
    pub variables: Option<Value>,
}
