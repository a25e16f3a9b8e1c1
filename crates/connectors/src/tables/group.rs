use super::{
    cell,
    graph::{self, HYDRATE_MEMBERSHIP_STATE, HYDRATE_MEMBERSHIPS},
    organization_column,
};
use crate::{
    client::DevOpsClient,
    resources::graph::{GraphGroup, GraphSubjectRow},
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

pub const TABLE: &str = "azuredevops_group";

const LIST_GROUPS: Operation = Operation::new(TABLE, "list_groups");
const GET_GROUP: Operation = Operation::new(TABLE, "get_group");

type GroupRow = GraphSubjectRow<GraphGroup>;
type Col = Column<GroupRow>;

pub struct GroupTable;

#[async_trait]
impl TableProvider<DevOpsClient> for GroupTable {
    type Row = GroupRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Group"
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
                "This is the non-unique display name of the graph subject.",
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
                "description",
                ColumnType::String,
                "A short phrase to help human readers disambiguate groups with similar names.",
                |r, _| cell(&r.subject.description),
            ),
            Col::new(
                "descriptor",
                ColumnType::String,
                "The descriptor is the primary way to reference the graph subject while the system is running.",
                |r, _| cell(&r.subject.descriptor),
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
                "The email address of record for a given graph member.",
                |r, _| cell(&r.subject.mail_address),
            ),
            Col::new(
                "origin_id",
                ColumnType::String,
                "The unique identifier from the system of origin.",
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
                cell(&r.subject.principal_name)
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
        emitter: &mut RowEmitter<'_, GroupRow>,
    ) -> Result<Flow, EngineError> {
        let groups = graph::list_subjects::<GraphGroup>("groups").map_rows(GroupRow::from);
        paginate(client, &LIST_GROUPS, &groups, emitter).await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<GroupRow>, EngineError> {
        let Some([descriptor]) = require_keys(quals, ["descriptor"]) else {
            return Ok(None);
        };
        let group: Option<GraphGroup> =
            graph::get_subject(client, &GET_GROUP, "groups", &descriptor).await?;
        Ok(group.map(GroupRow::from))
    }

    async fn hydrate(
        &self,
        client: &DevOpsClient,
        row: GroupRow,
        steps: &[&'static str],
    ) -> Result<GroupRow, EngineError> {
        graph::hydrate_subject(client, TABLE, row, steps).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use engine_core::catalog::{DynTable, ScanRequest, TableAdapter};
    use model::{core::value::Value, records::row::RowData};
    use serde_json::json;

    #[tokio::test]
    async fn memberships_are_fetched_per_group_when_selected() {
        let (client, transport) = MemoryTransport::new()
            .page(
                "_apis/graph/groups",
                None,
                vec![
                    json!({"descriptor": "vssgp.1", "principalName": "[Alpha]\\Readers"}),
                    json!({"descriptor": "vssgp.2", "principalName": "[Alpha]\\Contributors"}),
                ],
                None,
            )
            .entity("_apis/graph/memberships/vssgp.1", json!({"count": 0, "value": []}))
            .entity(
                "_apis/graph/memberships/vssgp.2",
                json!({"count": 1, "value": [{"containerDescriptor": "vssgp.9"}]}),
            )
            .into_client("contoso");
        let table = TableAdapter::new(GroupTable);

        let mut rows: Vec<RowData> = Vec::new();
        let request = ScanRequest::new(Quals::new()).with_columns(["title", "memberships"]);
        table.scan(&client, &request, &mut rows).await.unwrap();

        assert_eq!(rows[0].get_value("title"), Value::from("[Alpha]\\Readers"));
        assert_eq!(rows[0].get_value("memberships"), Value::from(json!([])));
        assert_eq!(
            rows[1].get_value("memberships"),
            Value::from(json!([{"containerDescriptor": "vssgp.9"}]))
        );
        assert!(transport.requests_to("_apis/graph/membershipstates/vssgp.1").is_empty());
    }

    #[tokio::test]
    async fn missing_descriptor_get_is_no_row() {
        let (client, transport) = MemoryTransport::new().into_client("contoso");

        assert!(GroupTable.get(&client, &Quals::new()).await.unwrap().is_none());
        assert_eq!(transport.request_count(), 0);
    }
}
