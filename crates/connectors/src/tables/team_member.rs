use super::{cell, team};
use crate::{
    client::{Collection, CursorStyle, DevOpsClient},
    resources::core::{TeamMember, TeamMemberRow, WebApiTeam},
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    chain::{ParentScope, chain},
    emitter::{Flow, RowEmitter},
    error::EngineError,
    paginate::ListRequestExt,
    table::{Column, KeyColumns, TableProvider},
};
use model::core::{data_type::ColumnType, qualifier::Quals};

pub const TABLE: &str = "azuredevops_team_member";

const LIST_MEMBERS: Operation = Operation::new(TABLE, "list_team_members");

/// A team without a project id cannot be addressed, so it is never admitted.
const TEAM_SCOPE: ParentScope<WebApiTeam> = ParentScope::new("team_id", |team| {
    team.project_id.as_ref().and(team.id.clone())
});

type Col = Column<TeamMemberRow>;

pub struct TeamMemberTable;

#[async_trait]
impl TableProvider<DevOpsClient> for TeamMemberTable {
    type Row = TeamMemberRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Team Member"
    }

    fn columns(&self) -> Vec<Column<TeamMemberRow>> {
        vec![
            Col::new("id", ColumnType::String, "The member id.", |r, _| {
                cell(&r.member.identity.id)
            }),
            Col::new(
                "display_name",
                ColumnType::String,
                "This is the non-unique display name of the graph subject. To change this field, you must alter its value in the source provider.",
                |r, _| cell(&r.member.identity.display_name),
            ),
            Col::new(
                "is_team_admin",
                ColumnType::Bool,
                "Check if the member is the team admin.",
                |r, _| cell(&r.member.is_team_admin),
            ),
            Col::new("project_id", ColumnType::String, "The project id.", |r, _| {
                Ok(r.project_id.clone().into())
            }),
            Col::new("team_id", ColumnType::String, "The team id.", |r, _| {
                Ok(r.team_id.clone().into())
            }),
            Col::new(
                "descriptor",
                ColumnType::String,
                "The descriptor is the primary way to reference the graph subject while the system is running. This field will uniquely identify the same graph subject across both Accounts and Organizations.",
                |r, _| cell(&r.member.identity.descriptor),
            ),
            Col::new(
                "url",
                ColumnType::String,
                "This url is the full route to the source resource of this graph subject.",
                |r, _| cell(&r.member.identity.url),
            ),
            Col::new(
                "is_deleted_in_origin",
                ColumnType::Bool,
                "Check if the member is already deleted.",
                |r, _| cell(&r.member.identity.is_deleted_in_origin),
            ),
            Col::new(
                "links",
                ColumnType::Json,
                "This field contains zero or more interesting links about the graph subject. These links may be invoked to obtain additional relationships or more detailed information about this graph subject.",
                |r, _| cell(&r.member.identity.links),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.member.identity.display_name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["team_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, TeamMemberRow>,
    ) -> Result<Flow, EngineError> {
        chain(
            client,
            &team::LIST_TEAMS,
            &team::list_teams(),
            &TEAM_SCOPE,
            quals,
            &LIST_MEMBERS,
            |parent, team_id| {
                let project_id = parent.project_id.clone().unwrap_or_default();
                let request = ApiRequest::new(
                    ApiHost::Organization,
                    [
                        "_apis",
                        "projects",
                        project_id.as_str(),
                        "teams",
                        team_id.as_str(),
                        "members",
                    ],
                    "7.1",
                );
                Collection::<TeamMember>::new(request)
                    .paged_by("$top")
                    .cursor(CursorStyle::None)
                    .map_rows(move |member| TeamMemberRow {
                        project_id: project_id.clone(),
                        team_id: team_id.clone(),
                        member,
                    })
            },
            emitter,
        )
        .await
    }
}
