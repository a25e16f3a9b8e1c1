use super::{cell, organization_column};
use crate::{
    client::{Collection, DevOpsClient, Single},
    resources::core::{ProjectRow, TeamProject, TeamProjectReference},
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    chain::ParentScope,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::{lookup, require_keys},
    paginate::{ListRequestExt, paginate},
    table::{Column, KeyColumns, TableProvider},
    translate::{Conversion, FilterMapping, translate},
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use serde_json::Value as Json;

pub const TABLE: &str = "azuredevops_project";

pub(crate) const LIST_PROJECTS: Operation = Operation::new(TABLE, "list_projects");
const GET_PROJECT: Operation = Operation::new(TABLE, "get_project");
const GET_PROPERTIES: Operation = Operation::new(TABLE, "get_project_properties");

const HYDRATE_PROJECT: &str = "get_project";
const HYDRATE_PROPERTIES: &str = "project_properties";

pub const PROJECT_STATES: &[&str] = &[
    "deleting",
    "new",
    "wellFormed",
    "createPending",
    "all",
    "unchanged",
    "deleted",
];

const FILTERS: &[FilterMapping] = &[FilterMapping::new(
    "state",
    "stateFilter",
    Conversion::Enum(PROJECT_STATES),
)];

/// Tables listed per project scope their rows with this.
pub(crate) const PROJECT_SCOPE: ParentScope<TeamProjectReference> =
    ParentScope::new("project_id", |project| project.id.clone());

/// Every project of the organization, a page at a time.
pub(crate) fn list_projects(params: Vec<(String, String)>) -> Collection<TeamProjectReference> {
    Collection::new(ApiRequest::new(ApiHost::Organization, ["_apis", "projects"], "7.1").params(params))
        .paged_by("$top")
}

type Col = Column<ProjectRow>;

pub struct ProjectTable;

impl ProjectTable {
    async fn fetch_project(
        client: &DevOpsClient,
        id: &str,
    ) -> Result<Option<TeamProject>, EngineError> {
        let request = ApiRequest::new(ApiHost::Organization, ["_apis", "projects", id], "7.1")
            .param("includeCapabilities", true);
        lookup(client, &GET_PROJECT, &Single::new(request)).await
    }

    async fn fetch_properties(client: &DevOpsClient, id: &str) -> Result<Option<Json>, EngineError> {
        let request = ApiRequest::new(
            ApiHost::Organization,
            ["_apis", "projects", id, "properties"],
            "7.1-preview.1",
        );
        let body: Option<Json> = lookup(client, &GET_PROPERTIES, &Single::new(request)).await?;
        Ok(body.map(|mut body| match body.get_mut("value") {
            Some(value) => value.take(),
            None => body,
        }))
    }
}

#[async_trait]
impl TableProvider<DevOpsClient> for ProjectTable {
    type Row = ProjectRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Project"
    }

    fn columns(&self) -> Vec<Column<ProjectRow>> {
        vec![
            organization_column(),
            Col::new("id", ColumnType::String, "Project identifier.", |r, _| {
                cell(&r.project.id)
            }),
            Col::new("name", ColumnType::String, "Project name.", |r, _| {
                cell(&r.project.name)
            }),
            Col::new("state", ColumnType::String, "Project state.", |r, _| {
                cell(&r.project.state)
            }),
            Col::new("visibility", ColumnType::String, "Project visibility.", |r, _| {
                cell(&r.project.visibility)
            }),
            Col::new("abbreviation", ColumnType::String, "Project abbreviation.", |r, _| {
                cell(&r.project.abbreviation)
            }),
            Col::new(
                "description",
                ColumnType::String,
                "The project's description (if any).",
                |r, _| cell(&r.project.description),
            ),
            Col::new(
                "last_update_time",
                ColumnType::Timestamp,
                "Project last update time.",
                |r, _| cell(&r.project.last_update_time),
            ),
            Col::new("revision", ColumnType::Int, "Project revision.", |r, _| {
                cell(&r.project.revision)
            }),
            Col::new(
                "url",
                ColumnType::String,
                "Url to the full version of the object.",
                |r, _| cell(&r.project.url),
            ),
            Col::hydrated(
                "capabilities",
                ColumnType::Json,
                "Set of capabilities this project has (such as process template & version control).",
                HYDRATE_PROJECT,
                |r, _| cell(&r.detail.as_ref().and_then(|d| d.capabilities.clone())),
            ),
            Col::hydrated(
                "default_team",
                ColumnType::Json,
                "The shallow ref to the default team.",
                HYDRATE_PROJECT,
                |r, _| cell(&r.detail.as_ref().and_then(|d| d.default_team.clone())),
            ),
            Col::hydrated(
                "links",
                ColumnType::Json,
                "The links to other objects related to this object.",
                HYDRATE_PROJECT,
                |r, _| cell(&r.detail.as_ref().and_then(|d| d.links.clone())),
            ),
            Col::hydrated(
                "properties",
                ColumnType::Json,
                "Get a collection of team project properties.",
                HYDRATE_PROPERTIES,
                |r, _| cell(&r.properties),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.project.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["state"])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, ProjectRow>,
    ) -> Result<Flow, EngineError> {
        let request = list_projects(translate(&LIST_PROJECTS, quals, FILTERS))
            .map_rows(ProjectRow::from);
        paginate(client, &LIST_PROJECTS, &request, emitter).await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<ProjectRow>, EngineError> {
        let Some([id]) = require_keys(quals, ["id"]) else {
            return Ok(None);
        };
        Ok(Self::fetch_project(client, &id).await?.map(ProjectRow::from))
    }

    async fn hydrate(
        &self,
        client: &DevOpsClient,
        mut row: ProjectRow,
        steps: &[&'static str],
    ) -> Result<ProjectRow, EngineError> {
        let Some(id) = row.project.id.clone() else {
            return Ok(row);
        };

        if steps.contains(&HYDRATE_PROJECT)
            && row.detail.is_none()
            && let Some(project) = Self::fetch_project(client, &id).await?
        {
            row.detail = Some(project.detail);
        }
        if steps.contains(&HYDRATE_PROPERTIES) {
            row.properties = Self::fetch_properties(client, &id).await?;
        }
        Ok(row)
    }
}
