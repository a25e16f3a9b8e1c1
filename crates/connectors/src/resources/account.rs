use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub account_owner: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub account_status: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub account_type: Option<String>,
    pub account_uri: Option<String>,
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub created_date: Option<DateTime<Utc>>,
    pub has_moved: Option<bool>,
    pub last_updated_by: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub last_updated_date: Option<DateTime<Utc>>,
    pub namespace_id: Option<String>,
    pub new_collection_id: Option<String>,
    pub organization_name: Option<String>,
    pub status_reason: Option<String>,
    pub properties: Option<Value>,
}
