use super::serde_helpers;
use serde::Deserialize;
use serde_json::Value;

/// Graph subjects are addressed by their descriptor.
pub trait GraphSubject: Send + Sync {
    fn descriptor(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    pub principal_name: Option<String>,
    pub display_name: Option<String>,
    pub domain: Option<String>,
    pub origin: Option<String>,
    pub directory_alias: Option<String>,
    pub descriptor: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub is_deleted_in_origin: Option<String>,
    pub legacy_descriptor: Option<String>,
    pub mail_address: Option<String>,
    pub meta_type: Option<String>,
    pub origin_id: Option<String>,
    pub subject_kind: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
}

impl GraphSubject for GraphUser {
    fn descriptor(&self) -> Option<&str> {
        self.descriptor.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphGroup {
    pub principal_name: Option<String>,
    pub display_name: Option<String>,
    pub domain: Option<String>,
    pub origin: Option<String>,
    pub description: Option<String>,
    pub descriptor: Option<String>,
    pub legacy_descriptor: Option<String>,
    pub mail_address: Option<String>,
    pub origin_id: Option<String>,
    pub subject_kind: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
}

impl GraphSubject for GraphGroup {
    fn descriptor(&self) -> Option<&str> {
        self.descriptor.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembershipState {
    pub active: Option<bool>,
}

/// A user or group plus the membership data fetched for it on demand.
#[derive(Debug, Clone, Default)]
pub struct GraphSubjectRow<T> {
    pub subject: T,
    pub membership_active: Option<bool>,
    pub memberships: Option<Value>,
}

impl<T> From<T> for GraphSubjectRow<T> {
    fn from(subject: T) -> Self {
        GraphSubjectRow {
            subject,
            membership_active: None,
            memberships: None,
        }
    }
}
