use super::{EntityRef, serde_helpers};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: Option<i64>,
    pub build_number: Option<String>,
    pub build_number_revision: Option<i64>,
    pub project: Option<EntityRef>,
    pub quality: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub reason: Option<String>,
    pub priority: Option<String>,
    pub deleted: Option<bool>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub deleted_date: Option<DateTime<Utc>>,
    pub deleted_reason: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub finish_time: Option<DateTime<Utc>>,
    pub keep_forever: Option<bool>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub last_changed_date: Option<DateTime<Utc>>,
    pub parameters: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub queue_options: Option<String>,
    pub queue_position: Option<i64>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub queue_time: Option<DateTime<Utc>>,
    pub retained_by_release: Option<bool>,
    pub source_branch: Option<String>,
    pub source_version: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    pub uri: Option<String>,
    pub url: Option<String>,
    pub agent_specification: Option<Value>,
    pub controller: Option<Value>,
    pub definition: Option<Value>,
    pub deleted_by: Option<Value>,
    pub demands: Option<Value>,
    pub last_changed_by: Option<Value>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
    pub logs: Option<Value>,
    pub orchestration_plan: Option<Value>,
    pub plans: Option<Value>,
    pub properties: Option<Value>,
    pub queue: Option<Value>,
    pub repository: Option<Value>,
    pub requested_by: Option<Value>,
    pub requested_for: Option<Value>,
    pub tags: Option<Value>,
    pub trigger_info: Option<Value>,
    pub triggered_by_build: Option<Value>,
    pub validation_results: Option<Value>,
}

/// A build definition as listed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinitionReference {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub quality: Option<String>,
    pub project: Option<EntityRef>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_date: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub queue_status: Option<String>,
    pub revision: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub uri: Option<String>,
    pub url: Option<String>,
    pub authored_by: Option<Value>,
    pub draft_of: Option<Value>,
    pub drafts: Option<Value>,
    pub latest_build: Option<Value>,
    pub latest_completed_build: Option<Value>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
    pub metrics: Option<Value>,
    pub queue: Option<Value>,
}

/// Fields only returned when a single definition is fetched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinitionDetail {
    pub badge_enabled: Option<bool>,
    pub build_number_format: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub drop_location: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub job_authorization_scope: Option<String>,
    pub job_cancel_timeout_in_minutes: Option<i64>,
    pub job_timeout_in_minutes: Option<i64>,
    pub repository: Option<EntityRef>,
    pub demands: Option<Value>,
    pub options: Option<Value>,
    pub process: Option<Value>,
    pub process_parameters: Option<Value>,
    pub properties: Option<Value>,
    pub retention_rules: Option<Value>,
    pub tags: Option<Value>,
    pub triggers: Option<Value>,
    pub variable_groups: Option<Value>,
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildDefinition {
    #[serde(flatten)]
    pub reference: BuildDefinitionReference,
    #[serde(flatten)]
    pub detail: BuildDefinitionDetail,
}

#[derive(Debug, Clone, Default)]
pub struct BuildDefinitionRow {
    pub definition: BuildDefinitionReference,
    pub detail: Option<BuildDefinitionDetail>,
}

impl From<BuildDefinitionReference> for BuildDefinitionRow {
    fn from(definition: BuildDefinitionReference) -> Self {
        BuildDefinitionRow {
            definition,
            detail: None,
        }
    }
}

impl From<BuildDefinition> for BuildDefinitionRow {
    fn from(definition: BuildDefinition) -> Self {
        BuildDefinitionRow {
            definition: definition.reference,
            detail: Some(definition.detail),
        }
    }
}
