use super::cell;
use crate::{
    client::{Collection, CursorStyle, DevOpsClient, Single},
    resources::core::WebApiTeam,
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::{lookup, require_keys},
    paginate::paginate,
    table::{Column, TableProvider},
};
use model::core::{data_type::ColumnType, qualifier::Quals};

pub const TABLE: &str = "azuredevops_team";

pub(crate) const LIST_TEAMS: Operation = Operation::new(TABLE, "list_teams");
const GET_TEAM: Operation = Operation::new(TABLE, "get_team");

/// Every team across all projects. The endpoint answers in one page.
pub(crate) fn list_teams() -> Collection<WebApiTeam> {
    let request = ApiRequest::new(ApiHost::Organization, ["_apis", "teams"], "7.1-preview.3")
        .param("$expandIdentity", true);
    Collection::new(request)
        .paged_by("$top")
        .cursor(CursorStyle::None)
}

type Col = Column<WebApiTeam>;

pub struct TeamTable;

#[async_trait]
impl TableProvider<DevOpsClient> for TeamTable {
    type Row = WebApiTeam;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Team"
    }

    fn columns(&self) -> Vec<Column<WebApiTeam>> {
        vec![
            Col::new(
                "id",
                ColumnType::String,
                "Team (Identity) Guid. A Team Foundation ID.",
                |r, _| cell(&r.id),
            ),
            Col::new("name", ColumnType::String, "Team name.", |r, _| cell(&r.name)),
            Col::new("project_id", ColumnType::String, "The project id.", |r, _| {
                cell(&r.project_id)
            }),
            Col::new("project_name", ColumnType::String, "The project name.", |r, _| {
                cell(&r.project_name)
            }),
            Col::new("description", ColumnType::String, "Team description.", |r, _| {
                cell(&r.description)
            }),
            Col::new(
                "identity_url",
                ColumnType::String,
                "Identity REST API Url to this team.",
                |r, _| cell(&r.identity_url),
            ),
            Col::new("url", ColumnType::String, "Team REST API Url.", |r, _| cell(&r.url)),
            Col::new("identity", ColumnType::Json, "Team identity.", |r, _| {
                cell(&r.identity)
            }),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.name)
            }),
        ]
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id", "project_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        _quals: &Quals,
        emitter: &mut RowEmitter<'_, WebApiTeam>,
    ) -> Result<Flow, EngineError> {
        paginate(client, &LIST_TEAMS, &list_teams(), emitter).await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<WebApiTeam>, EngineError> {
        let Some([id, project_id]) = require_keys(quals, ["id", "project_id"]) else {
            return Ok(None);
        };
        let request = ApiRequest::new(
            ApiHost::Organization,
            ["_apis", "projects", project_id.as_str(), "teams", id.as_str()],
            "7.1",
        )
        .param("$expandIdentity", true);
        lookup(client, &GET_TEAM, &Single::new(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use serde_json::json;

    #[tokio::test]
    async fn get_fetches_the_team_under_its_project() {
        let (client, transport) = MemoryTransport::new()
            .entity(
                "_apis/projects/p1/teams/t1",
                json!({"id": "t1", "name": "Core", "projectId": "p1"}),
            )
            .into_client("contoso");

        let quals = Quals::new().with("id", "t1").with("project_id", "p1");
        let team = TeamTable.get(&client, &quals).await.unwrap().unwrap();
        assert_eq!(team.name.as_deref(), Some("Core"));
        assert_eq!(
            transport.requests()[0].query_value("$expandIdentity"),
            Some("true")
        );
    }

    #[tokio::test]
    async fn missing_team_is_no_row() {
        let (client, transport) = MemoryTransport::new().into_client("contoso");

        let quals = Quals::new().with("id", "t9").with("project_id", "p1");
        assert!(TeamTable.get(&client, &quals).await.unwrap().is_none());
        assert_eq!(transport.request_count(), 1);

        let partial = Quals::new().with("id", "t9");
        assert!(TeamTable.get(&client, &partial).await.unwrap().is_none());
        assert_eq!(transport.request_count(), 1);
    }
}
