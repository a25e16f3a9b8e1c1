//! Typed shapes of the REST resources the tables read. Every field is
//! optional: the service omits fields freely and a missing field must
//! surface as a null column, not a decode failure.

pub mod account;
pub mod build;
pub mod core;
pub mod dashboard;
pub mod git;
pub mod graph;
pub mod pipeline;
pub mod release;
pub mod service_endpoint;

pub(crate) mod serde_helpers;

use serde::{Deserialize, Serialize};

/// A reference to another entity (project, repository, ...). Unknown fields
/// are kept so the reference can be emitted whole as a JSON column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(default, deserialize_with = "serde_helpers::lenient_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A resource listed under a parent, together with the parent's id.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoped<T> {
    pub parent_id: String,
    pub resource: T,
}

impl<T> Scoped<T> {
    pub fn new(parent_id: impl Into<String>, resource: T) -> Self {
        Scoped {
            parent_id: parent_id.into(),
            resource,
        }
    }
}
