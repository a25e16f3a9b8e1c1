use super::{cell, project};
use crate::{
    client::{Collection, CursorStyle, DevOpsClient, Single},
    resources::{Scoped, service_endpoint::ServiceEndpoint},
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    chain::chain,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::{lookup, require_keys},
    paginate::ListRequestExt,
    table::{Column, KeyColumns, TableProvider},
    translate::{Conversion, FilterMapping, translate},
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use tracing::debug;
use uuid::Uuid;

pub const TABLE: &str = "azuredevops_serviceendpoint";

const LIST_ENDPOINTS: Operation = Operation::new(TABLE, "list_service_endpoints");
const GET_ENDPOINT: Operation = Operation::new(TABLE, "get_service_endpoint");

const FILTERS: &[FilterMapping] = &[
    FilterMapping::text("type", "type"),
    FilterMapping::text("owner", "owner"),
    FilterMapping::new("id", "endpointIds", Conversion::Uuid),
];

type EndpointRow = Scoped<ServiceEndpoint>;
type Col = Column<EndpointRow>;

fn endpoints<'a>(project_id: &'a str, rest: &[&'a str]) -> ApiRequest {
    let mut path = vec![project_id, "_apis", "serviceendpoint", "endpoints"];
    path.extend_from_slice(rest);
    ApiRequest::new(ApiHost::Organization, path, "7.1")
}

pub struct ServiceEndpointTable;

#[async_trait]
impl TableProvider<DevOpsClient> for ServiceEndpointTable {
    type Row = EndpointRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Service Endpoint"
    }

    fn columns(&self) -> Vec<Col> {
        vec![
            Col::new("id", ColumnType::String, "Gets the identifier of this endpoint.", |r, _| {
                cell(&r.resource.id)
            }),
            Col::new("name", ColumnType::String, "Gets the friendly name of the endpoint.", |r, _| {
                cell(&r.resource.name)
            }),
            Col::new("is_ready", ColumnType::Bool, "EndPoint state indicator.", |r, _| {
                cell(&r.resource.is_ready)
            }),
            Col::new(
                "is_shared",
                ColumnType::Bool,
                "Indicates whether service endpoint is shared with other projects or not.",
                |r, _| cell(&r.resource.is_shared),
            ),
            Col::new(
                "project_id",
                ColumnType::String,
                "ID of the project this service endpoint belongs to.",
                |r, _| Ok(r.parent_id.clone().into()),
            ),
            Col::new(
                "description",
                ColumnType::String,
                "Gets the description of endpoint.",
                |r, _| cell(&r.resource.description),
            ),
            Col::new(
                "owner",
                ColumnType::String,
                "Owner of the endpoint. Supported values are library and agentcloud.",
                |r, _| cell(&r.resource.owner),
            ),
            Col::new("type", ColumnType::String, "Gets the type of the endpoint.", |r, _| {
                cell(&r.resource.kind)
            }),
            Col::new("url", ColumnType::String, "Gets the url of the endpoint.", |r, _| {
                cell(&r.resource.url)
            }),
            Col::new(
                "administrators_group",
                ColumnType::Json,
                "Gets the identity reference for the administrators group of the service endpoint.",
                |r, _| cell(&r.resource.administrators_group),
            ),
            Col::new(
                "authorization",
                ColumnType::Json,
                "Gets the authorization data for talking to the endpoint.",
                |r, _| cell(&r.resource.authorization),
            ),
            Col::new(
                "created_by",
                ColumnType::Json,
                "Gets the identity reference for the user who created the Service endpoint.",
                |r, _| cell(&r.resource.created_by),
            ),
            Col::new("data", ColumnType::Json, "The service endpoint data.", |r, _| {
                cell(&r.resource.data)
            }),
            Col::new(
                "operation_status",
                ColumnType::Json,
                "Error message during creation/deletion of endpoint.",
                |r, _| cell(&r.resource.operation_status),
            ),
            Col::new(
                "readers_group",
                ColumnType::Json,
                "Gets the identity reference for the readers group of the service endpoint.",
                |r, _| cell(&r.resource.readers_group),
            ),
            Col::new(
                "service_endpoint_project_references",
                ColumnType::Json,
                "All other project references where the service endpoint is shared.",
                |r, _| cell(&r.resource.service_endpoint_project_references),
            ),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["project_id", "type", "owner", "id"])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id", "project_id"])
    }

    /// Failed endpoints are included, with their details.
    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, EndpointRow>,
    ) -> Result<Flow, EngineError> {
        let filters = translate(&LIST_ENDPOINTS, quals, FILTERS);
        chain(
            client,
            &project::LIST_PROJECTS,
            &project::list_projects(Vec::new()),
            &project::PROJECT_SCOPE,
            quals,
            &LIST_ENDPOINTS,
            |_, project_id| {
                let request = endpoints(&project_id, &[])
                    .param("includeFailed", true)
                    .param("includeDetails", true)
                    .params(filters.clone());
                Collection::<ServiceEndpoint>::new(request)
                    .cursor(CursorStyle::None)
                    .map_rows(move |endpoint| Scoped::new(project_id.clone(), endpoint))
            },
            emitter,
        )
        .await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<EndpointRow>, EngineError> {
        let Some([id, project_id]) = require_keys(quals, ["id", "project_id"]) else {
            return Ok(None);
        };
        let Ok(id) = Uuid::parse_str(id.trim()) else {
            debug!(table = TABLE, id = %id, "service endpoint id is not a uuid");
            return Ok(None);
        };
        let id = id.hyphenated().to_string();
        let request = endpoints(&project_id, &[id.as_str()]);
        let endpoint: Option<ServiceEndpoint> =
            lookup(client, &GET_ENDPOINT, &Single::new(request)).await?;
        Ok(endpoint.map(|endpoint| Scoped::new(project_id, endpoint)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use engine_core::catalog::{DynTable, ScanRequest, TableAdapter};
    use model::{core::value::Value, records::row::RowData};
    use serde_json::json;

    const ENDPOINT: &str = "0f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0";

    #[tokio::test]
    async fn filters_reach_every_project_call() {
        let (client, transport) = MemoryTransport::new()
            .page("_apis/projects", None, vec![json!({"id": "P1"}), json!({"id": "P2"})], None)
            .page(
                "P1/_apis/serviceendpoint/endpoints",
                None,
                vec![json!({"id": ENDPOINT, "name": "arm", "type": "azurerm", "isReady": true})],
                None,
            )
            .page("P2/_apis/serviceendpoint/endpoints", None, vec![], None)
            .into_client("contoso");
        let table = TableAdapter::new(ServiceEndpointTable);

        let quals = Quals::new()
            .with("type", "azurerm")
            .with("id", ENDPOINT.to_uppercase());
        let mut rows: Vec<RowData> = Vec::new();
        table
            .scan(&client, &ScanRequest::new(quals), &mut rows)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_value("type"), Value::from("azurerm"));
        assert_eq!(rows[0].get_value("project_id"), Value::from("P1"));
        for project in ["P1", "P2"] {
            let sent = &transport.requests_to(&format!("{project}/_apis/serviceendpoint/endpoints"))[0];
            assert_eq!(sent.query_value("includeFailed"), Some("true"));
            assert_eq!(sent.query_value("type"), Some("azurerm"));
            assert_eq!(sent.query_value("endpointIds"), Some(ENDPOINT));
        }
    }

    #[tokio::test]
    async fn get_rejects_a_malformed_id_without_calling() {
        let (client, transport) = MemoryTransport::new().into_client("contoso");

        let quals = Quals::new().with("id", "arm-connection").with("project_id", "P1");
        let row = ServiceEndpointTable.get(&client, &quals).await.unwrap();

        assert!(row.is_none());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn get_keeps_the_qualified_project() {
        let path = format!("P1/_apis/serviceendpoint/endpoints/{ENDPOINT}");
        let (client, _) = MemoryTransport::new()
            .entity(&path, json!({"id": ENDPOINT, "owner": "library"}))
            .into_client("contoso");

        let quals = Quals::new().with("id", ENDPOINT).with("project_id", "P1");
        let row = ServiceEndpointTable.get(&client, &quals).await.unwrap().unwrap();
        assert_eq!(row.parent_id, "P1");
        assert_eq!(row.resource.owner.as_deref(), Some("library"));
    }
}
