use super::{
    cell,
    graph::{self, HYDRATE_MEMBERSHIP_STATE, HYDRATE_MEMBERSHIPS},
    organization_column,
};
use crate::{
    client::DevOpsClient,
    resources::graph::{GraphSubjectRow, GraphUser},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::require_keys,
    paginate::{ListRequestExt, paginate},
    table::{Column, TableProvider},
};
use model::core::{data_type::ColumnType, qualifier::Quals};

pub const TABLE: &str = "azuredevops_user";

const LIST_USERS: Operation = Operation::new(TABLE, "list_users");
const GET_USER: Operation = Operation::new(TABLE, "get_user");

type UserRow = GraphSubjectRow<GraphUser>;
type Col = Column<UserRow>;

pub struct UserTable;

#[async_trait]
impl TableProvider<DevOpsClient> for UserTable {
    type Row = UserRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps User"
    }

    fn columns(&self) -> Vec<Col> {
        vec![
            organization_column(),
            Col::new(
                "principal_name",
                ColumnType::String,
                "This is the PrincipalName of this graph member from the source provider.",
                |r, _| cell(&r.subject.principal_name),
            ),
            Col::new(
                "display_name",
                ColumnType::String,
                "This is the non-unique display name of the graph subject. To change this field, you must alter its value in the source provider.",
                |r, _| cell(&r.subject.display_name),
            ),
            Col::hydrated(
                "membership_state",
                ColumnType::Bool,
                "When true, the membership is active.",
                HYDRATE_MEMBERSHIP_STATE,
                |r, _| cell(&r.membership_active),
            ),
            Col::new(
                "domain",
                ColumnType::String,
                "This represents the name of the container of origin for a graph member.",
                |r, _| cell(&r.subject.domain),
            ),
            Col::new(
                "origin",
                ColumnType::String,
                "The type of source provider for the origin identifier (ex:AD, AAD, MSA).",
                |r, _| cell(&r.subject.origin),
            ),
            Col::new(
                "directory_alias",
                ColumnType::String,
                "The short, generally unique name for the user in the backing directory.",
                |r, _| cell(&r.subject.directory_alias),
            ),
            Col::new(
                "descriptor",
                ColumnType::String,
                "The descriptor is the primary way to reference the graph subject while the system is running. This field will uniquely identify the same graph subject across both Accounts and Organizations.",
                |r, _| cell(&r.subject.descriptor),
            ),
            Col::new(
                "is_deleted_in_origin",
                ColumnType::String,
                "When true, the user has been deleted in the identity provider.",
                |r, _| cell(&r.subject.is_deleted_in_origin),
            ),
            Col::new(
                "legacy_descriptor",
                ColumnType::String,
                "The legacy descriptor is here in case you need to access old version IMS using identity descriptor.",
                |r, _| cell(&r.subject.legacy_descriptor),
            ),
            Col::new(
                "mail_address",
                ColumnType::String,
                "The email address of record for a given graph member. This may be different than the principal name.",
                |r, _| cell(&r.subject.mail_address),
            ),
            Col::new(
                "meta_type",
                ColumnType::String,
                "The meta type of the user in the origin, such as member, guest, etc.",
                |r, _| cell(&r.subject.meta_type),
            ),
            Col::new(
                "origin_id",
                ColumnType::String,
                "The unique identifier from the system of origin. Typically a sid, object id or Guid.",
                |r, _| cell(&r.subject.origin_id),
            ),
            Col::new(
                "subject_kind",
                ColumnType::String,
                "This field identifies the type of the graph subject (ex: Group, Scope, User).",
                |r, _| cell(&r.subject.subject_kind),
            ),
            Col::new(
                "url",
                ColumnType::String,
                "This url is the full route to the source resource of this graph subject.",
                |r, _| cell(&r.subject.url),
            ),
            Col::new(
                "links",
                ColumnType::Json,
                "This field contains zero or more interesting links about the graph subject.",
                |r, _| cell(&r.subject.links),
            ),
            Col::hydrated(
                "memberships",
                ColumnType::Json,
                "Get all the memberships where this descriptor is a member in the relationship.",
                HYDRATE_MEMBERSHIPS,
                |r, _| cell(&r.memberships),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.subject.display_name)
            }),
        ]
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["descriptor"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        _quals: &Quals,
        emitter: &mut RowEmitter<'_, UserRow>,
    ) -> Result<Flow, EngineError> {
        let users = graph::list_subjects::<GraphUser>("users").map_rows(UserRow::from);
        paginate(client, &LIST_USERS, &users, emitter).await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<UserRow>, EngineError> {
        let Some([descriptor]) = require_keys(quals, ["descriptor"]) else {
            return Ok(None);
        };
        let user: Option<GraphUser> =
            graph::get_subject(client, &GET_USER, "users", &descriptor).await?;
        Ok(user.map(UserRow::from))
    }

    async fn hydrate(
        &self,
        client: &DevOpsClient,
        row: UserRow,
        steps: &[&'static str],
    ) -> Result<UserRow, EngineError> {
        graph::hydrate_subject(client, TABLE, row, steps).await
    }
}
