use super::{cell, project};
use crate::{
    client::{Collection, CursorStyle, DevOpsClient},
    resources::{Scoped, dashboard::Dashboard},
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    chain::chain,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    paginate::ListRequestExt,
    table::{Column, KeyColumns, TableProvider},
};
use model::core::{data_type::ColumnType, qualifier::Quals};

pub const TABLE: &str = "azuredevops_dashboard";

const LIST_DASHBOARDS: Operation = Operation::new(TABLE, "list_dashboards");

type DashboardRow = Scoped<Dashboard>;
type Col = Column<DashboardRow>;

/// Dashboards of a project, or of one team in it when `team` is given.
fn dashboards(project_id: &str, team: Option<&str>) -> Collection<Dashboard> {
    let mut path = vec![project_id, "_apis", "dashboard", "dashboards"];
    if let Some(team) = team {
        path.insert(1, team);
    }
    let request = ApiRequest::new(ApiHost::Organization, path, "7.1-preview.3");
    Collection::new(request).cursor(CursorStyle::None)
}

pub struct DashboardTable;

#[async_trait]
impl TableProvider<DevOpsClient> for DashboardTable {
    type Row = DashboardRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Dashboard"
    }

    fn columns(&self) -> Vec<Col> {
        vec![
            Col::new(
                "id",
                ColumnType::String,
                "ID of the dashboard. Provided by service at creation time.",
                |r, _| cell(&r.resource.id),
            ),
            Col::new("name", ColumnType::String, "Name of the Dashboard.", |r, _| {
                cell(&r.resource.name)
            }),
            Col::new(
                "dashboard_scope",
                ColumnType::String,
                "Entity to which the dashboard is scoped.",
                |r, _| cell(&r.resource.dashboard_scope),
            ),
            Col::new(
                "group_id",
                ColumnType::String,
                "ID of the group for a dashboard. For team-scoped dashboards, this is the unique identifier for the team associated with the dashboard. For project-scoped dashboards this property is empty.",
                |r, _| cell(&r.resource.group_id),
            ),
            Col::new(
                "owner_id",
                ColumnType::String,
                "ID of the owner for a dashboard. For team-scoped dashboards, this is the unique identifier for the team associated with the dashboard. For project-scoped dashboards, this is the unique identifier for the user identity associated with the dashboard.",
                |r, _| cell(&r.resource.owner_id),
            ),
            Col::new(
                "project_id",
                ColumnType::String,
                "ID of the project this dashboard belongs to.",
                |r, _| Ok(r.parent_id.clone().into()),
            ),
            Col::new(
                "description",
                ColumnType::String,
                "Description of the dashboard.",
                |r, _| cell(&r.resource.description),
            ),
            Col::new(
                "etag",
                ColumnType::String,
                "Server defined version tracking value, used for edit collision detection.",
                |r, _| cell(&r.resource.etag),
            ),
            Col::new(
                "position",
                ColumnType::Int,
                "Position of the dashboard, within a dashboard group. If unset at creation time, position is decided by the service.",
                |r, _| cell(&r.resource.position),
            ),
            Col::new(
                "refresh_interval",
                ColumnType::Int,
                "Interval for client to automatically refresh the dashboard. Expressed in minutes.",
                |r, _| cell(&r.resource.refresh_interval),
            ),
            Col::new("url", ColumnType::String, "URL of the dashboard.", |r, _| {
                cell(&r.resource.url)
            }),
            Col::new(
                "links",
                ColumnType::Json,
                "The class to represent a collection of REST reference links.",
                |r, _| cell(&r.resource.links),
            ),
            Col::new("widgets", ColumnType::Json, "The set of Widgets on the dashboard.", |r, _| {
                cell(&r.resource.widgets)
            }),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.resource.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["project_id", "group_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, DashboardRow>,
    ) -> Result<Flow, EngineError> {
        let team = quals.get_str("group_id");
        chain(
            client,
            &project::LIST_PROJECTS,
            &project::list_projects(Vec::new()),
            &project::PROJECT_SCOPE,
            quals,
            &LIST_DASHBOARDS,
            |_, project_id| {
                dashboards(&project_id, team.as_deref())
                    .map_rows(move |dashboard| Scoped::new(project_id.clone(), dashboard))
            },
            emitter,
        )
        .await
    }
}
