use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// A project as listed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProjectReference {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub state: Option<String>,
    pub revision: Option<i64>,
    pub visibility: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::timestamp")]
    pub last_update_time: Option<DateTime<Utc>>,
    pub abbreviation: Option<String>,
}

/// Fields only returned when a single project is fetched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub capabilities: Option<Value>,
    pub default_team: Option<Value>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamProject {
    #[serde(flatten)]
    pub reference: TeamProjectReference,
    #[serde(flatten)]
    pub detail: ProjectDetail,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectRow {
    pub project: TeamProjectReference,
    pub detail: Option<ProjectDetail>,
    pub properties: Option<Value>,
}

impl From<TeamProjectReference> for ProjectRow {
    fn from(project: TeamProjectReference) -> Self {
        ProjectRow {
            project,
            detail: None,
            properties: None,
        }
    }
}

impl From<TeamProject> for ProjectRow {
    fn from(project: TeamProject) -> Self {
        ProjectRow {
            project: project.reference,
            detail: Some(project.detail),
            properties: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebApiTeam {
    pub id: Option<String>,
    pub name: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub identity_url: Option<String>,
    pub url: Option<String>,
    pub identity: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub unique_name: Option<String>,
    pub descriptor: Option<String>,
    pub url: Option<String>,
    pub is_deleted_in_origin: Option<bool>,
    #[serde(rename = "_links")]
    pub links: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    #[serde(default)]
    pub identity: IdentityRef,
    pub is_team_admin: Option<bool>,
}

/// A team member together with the team and project it was listed under.
#[derive(Debug, Clone, Default)]
pub struct TeamMemberRow {
    pub project_id: String,
    pub team_id: String,
    pub member: TeamMember,
}
