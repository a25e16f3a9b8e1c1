use super::{cell, project};
use crate::{
    client::{Collection, DevOpsClient, Single},
    resources::build::Build,
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    chain::chain,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::{lookup, require_keys},
    table::{Column, KeyColumns, TableProvider, json},
    translate::{Conversion, FilterMapping, translate},
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use tracing::debug;

pub const TABLE: &str = "azuredevops_build";

const LIST_BUILDS: Operation = Operation::new(TABLE, "list_builds");
const GET_BUILD: Operation = Operation::new(TABLE, "get_build");

pub const BUILD_REASONS: &[&str] = &[
    "none",
    "manual",
    "individualCI",
    "batchedCI",
    "schedule",
    "scheduleForced",
    "userCreated",
    "validateShelveset",
    "checkInShelveset",
    "pullRequest",
    "buildCompletion",
    "resourceTrigger",
    "triggered",
    "all",
];

pub const BUILD_STATUSES: &[&str] = &[
    "none",
    "inProgress",
    "completed",
    "cancelling",
    "postponed",
    "notStarted",
    "all",
];

pub const BUILD_RESULTS: &[&str] = &[
    "none",
    "succeeded",
    "partiallySucceeded",
    "failed",
    "canceled",
];

const FILTERS: &[FilterMapping] = &[
    FilterMapping::text("build_number", "buildNumber"),
    FilterMapping::new("reason", "reasonFilter", Conversion::Enum(BUILD_REASONS)),
    FilterMapping::new("status", "statusFilter", Conversion::Enum(BUILD_STATUSES)),
    FilterMapping::new("result", "resultFilter", Conversion::Enum(BUILD_RESULTS)),
    FilterMapping::new(
        "deleted",
        "deletedFilter",
        Conversion::Flag {
            on: "onlyDeleted",
            off: "excludeDeleted",
        },
    ),
    FilterMapping::new("id", "buildIds", Conversion::Integer),
];

type Col = Column<Build>;

pub struct BuildTable;

#[async_trait]
impl TableProvider<DevOpsClient> for BuildTable {
    type Row = Build;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Build"
    }

    fn columns(&self) -> Vec<Column<Build>> {
        vec![
            Col::new("id", ColumnType::Int, "The ID of the build.", |r, _| cell(&r.id)),
            Col::new(
                "build_number",
                ColumnType::String,
                "The build number/name of the build.",
                |r, _| cell(&r.build_number),
            ),
            Col::new(
                "project_id",
                ColumnType::String,
                "ID of the project this build belongs to.",
                |r, _| cell(&r.project.as_ref().and_then(|p| p.id.clone())),
            ),
            Col::new(
                "quality",
                ColumnType::String,
                "The quality of the xaml build (good, bad, etc.).",
                |r, _| cell(&r.quality),
            ),
            Col::new("status", ColumnType::String, "The status of the build.", |r, _| {
                cell(&r.status)
            }),
            Col::new(
                "build_number_revision",
                ColumnType::Int,
                "The build number revision.",
                |r, _| cell(&r.build_number_revision),
            ),
            Col::new(
                "deleted",
                ColumnType::Bool,
                "Indicates whether the build has been deleted.",
                |r, _| cell(&r.deleted),
            ),
            Col::new(
                "deleted_date",
                ColumnType::Timestamp,
                "The date the build was deleted.",
                |r, _| cell(&r.deleted_date),
            ),
            Col::new(
                "deleted_reason",
                ColumnType::String,
                "The description of how the build was deleted.",
                |r, _| cell(&r.deleted_reason),
            ),
            Col::new(
                "finish_time",
                ColumnType::Timestamp,
                "The time that the build was completed.",
                |r, _| cell(&r.finish_time),
            ),
            Col::new(
                "keep_forever",
                ColumnType::Bool,
                "Indicates whether the build should be skipped by retention policies.",
                |r, _| cell(&r.keep_forever),
            ),
            Col::new(
                "last_changed_date",
                ColumnType::Timestamp,
                "The date the build was last changed.",
                |r, _| cell(&r.last_changed_date),
            ),
            Col::new("parameters", ColumnType::String, "The parameters for the build.", |r, _| {
                cell(&r.parameters)
            }),
            Col::new("priority", ColumnType::String, "The build's priority.", |r, _| {
                cell(&r.priority)
            }),
            Col::new(
                "queue_options",
                ColumnType::String,
                "Additional options for queueing the build.",
                |r, _| cell(&r.queue_options),
            ),
            Col::new(
                "queue_position",
                ColumnType::Int,
                "The current position of the build in the queue.",
                |r, _| cell(&r.queue_position),
            ),
            Col::new(
                "queue_time",
                ColumnType::Timestamp,
                "The time that the build was queued.",
                |r, _| cell(&r.queue_time),
            ),
            Col::new(
                "reason",
                ColumnType::String,
                "The reason that the build was created.",
                |r, _| cell(&r.reason),
            ),
            Col::new("result", ColumnType::String, "The build result.", |r, _| {
                cell(&r.result)
            }),
            Col::new(
                "retained_by_release",
                ColumnType::Bool,
                "Indicates whether the build is retained by a release.",
                |r, _| cell(&r.retained_by_release),
            ),
            Col::new("source_branch", ColumnType::String, "The source branch.", |r, _| {
                cell(&r.source_branch)
            }),
            Col::new("source_version", ColumnType::String, "The source version.", |r, _| {
                cell(&r.source_version)
            }),
            Col::new(
                "start_time",
                ColumnType::Timestamp,
                "The time that the build was started.",
                |r, _| cell(&r.start_time),
            ),
            Col::new("uri", ColumnType::String, "The URI of the build.", |r, _| cell(&r.uri)),
            Col::new("url", ColumnType::String, "The REST URL of the build.", |r, _| {
                cell(&r.url)
            }),
            Col::new(
                "agent_specification",
                ColumnType::Json,
                "The agent specification for the build.",
                |r, _| cell(&r.agent_specification),
            ),
            Col::new(
                "controller",
                ColumnType::Json,
                "The build controller. This is only set if the definition type is Xaml.",
                |r, _| cell(&r.controller),
            ),
            Col::new(
                "definition",
                ColumnType::Json,
                "The definition associated with the build.",
                |r, _| cell(&r.definition),
            ),
            Col::new(
                "deleted_by",
                ColumnType::Json,
                "The identity of the process or person that deleted the build.",
                |r, _| cell(&r.deleted_by),
            ),
            Col::new(
                "demands",
                ColumnType::Json,
                "A list of demands that represents the agent capabilities required by this build.",
                |r, _| cell(&r.demands),
            ),
            Col::new(
                "last_changed_by",
                ColumnType::Json,
                "The identity representing the process or person that last changed the build.",
                |r, _| cell(&r.last_changed_by),
            ),
            Col::new(
                "links",
                ColumnType::Json,
                "The class to represent a collection of REST reference links.",
                |r, _| cell(&r.links),
            ),
            Col::new("logs", ColumnType::Json, "Information about the build logs.", |r, _| {
                cell(&r.logs)
            }),
            Col::new(
                "orchestration_plan",
                ColumnType::Json,
                "The orchestration plan for the build.",
                |r, _| cell(&r.orchestration_plan),
            ),
            Col::new(
                "plans",
                ColumnType::Json,
                "Orchestration plans associated with the build (build, cleanup).",
                |r, _| cell(&r.plans),
            ),
            Col::new("project", ColumnType::Json, "The team project.", |r, _| {
                json(&r.project)
            }),
            Col::new("properties", ColumnType::Json, "The build properties.", |r, _| {
                cell(&r.properties)
            }),
            Col::new(
                "queue",
                ColumnType::Json,
                "The queue. This is only set if the definition type is Build.",
                |r, _| cell(&r.queue),
            ),
            Col::new("repository", ColumnType::Json, "The repository.", |r, _| {
                cell(&r.repository)
            }),
            Col::new(
                "requested_by",
                ColumnType::Json,
                "The identity that queued the build.",
                |r, _| cell(&r.requested_by),
            ),
            Col::new(
                "requested_for",
                ColumnType::Json,
                "The identity on whose behalf the build was queued.",
                |r, _| cell(&r.requested_for),
            ),
            Col::new("tags", ColumnType::Json, "The build tags.", |r, _| cell(&r.tags)),
            Col::new(
                "trigger_info",
                ColumnType::Json,
                "Sourceprovider-specific information about what triggered the build.",
                |r, _| cell(&r.trigger_info),
            ),
            Col::new(
                "triggered_by_build",
                ColumnType::Json,
                "The build that triggered this build via a Build completion trigger.",
                |r, _| cell(&r.triggered_by_build),
            ),
            Col::new(
                "validation_results",
                ColumnType::Json,
                "Represents the result of validating a build request.",
                |r, _| cell(&r.validation_results),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.build_number)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&[
            "project_id",
            "build_number",
            "reason",
            "status",
            "result",
            "deleted",
            "id",
        ])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id", "project_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, Build>,
    ) -> Result<Flow, EngineError> {
        let filters = translate(&LIST_BUILDS, quals, FILTERS);
        chain(
            client,
            &project::LIST_PROJECTS,
            &project::list_projects(Vec::new()),
            &project::PROJECT_SCOPE,
            quals,
            &LIST_BUILDS,
            |_, project_id| {
                let request = ApiRequest::new(
                    ApiHost::Organization,
                    [project_id.as_str(), "_apis", "build", "builds"],
                    "7.1",
                )
                .params(filters.clone());
                Collection::<Build>::new(request).paged_by("$top")
            },
            emitter,
        )
        .await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<Build>, EngineError> {
        let Some([id, project_id]) = require_keys(quals, ["id", "project_id"]) else {
            return Ok(None);
        };
        if id.parse::<i64>().is_err() {
            debug!(table = TABLE, id = %id, "build id is not an integer");
            return Ok(None);
        }
        let request = ApiRequest::new(
            ApiHost::Organization,
            [project_id.as_str(), "_apis", "build", "builds", id.as_str()],
            "7.1",
        );
        lookup(client, &GET_BUILD, &Single::new(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use engine_core::catalog::{DynTable, ScanRequest, TableAdapter};
    use model::{core::value::Value, records::row::RowData};
    use serde_json::json;
    use tracing_test::traced_test;

    fn two_projects() -> MemoryTransport {
        MemoryTransport::new().page(
            "_apis/projects",
            None,
            vec![json!({"id": "P1", "name": "Alpha"}), json!({"id": "P2", "name": "Beta"})],
            None,
        )
    }

    #[tokio::test]
    async fn project_qualifier_lists_only_that_project() {
        let (client, transport) = two_projects()
            .page(
                "P1/_apis/build/builds",
                None,
                vec![
                    json!({"id": 11, "buildNumber": "20240101.1", "project": {"id": "P1"}}),
                    json!({"id": 12, "buildNumber": "20240101.2", "project": {"id": "P1"}}),
                ],
                None,
            )
            .into_client("contoso");
        let table = TableAdapter::new(BuildTable);

        let mut rows: Vec<RowData> = Vec::new();
        let request = ScanRequest::new(Quals::new().with("project_id", "P1"));
        table.scan(&client, &request, &mut rows).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_value("project_id"), Value::from("P1"));
        assert_eq!(rows[1].get_value("title"), Value::from("20240101.2"));
        assert!(transport.requests_to("P2/_apis/build/builds").is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn filters_are_sent_and_bad_literals_dropped() {
        let (client, transport) = two_projects()
            .page("P1/_apis/build/builds", None, vec![], None)
            .page("P2/_apis/build/builds", None, vec![], None)
            .into_client("contoso");
        let table = TableAdapter::new(BuildTable);

        let quals = Quals::new()
            .with("status", "completed")
            .with("result", "exploded")
            .with("deleted", false)
            .with("build_number", "20240101.1");
        let mut rows: Vec<RowData> = Vec::new();
        table
            .scan(&client, &ScanRequest::new(quals).with_limit(Some(5)), &mut rows)
            .await
            .unwrap();

        let sent = &transport.requests_to("P2/_apis/build/builds")[0];
        assert_eq!(sent.query_value("statusFilter"), Some("completed"));
        assert_eq!(sent.query_value("deletedFilter"), Some("excludeDeleted"));
        assert_eq!(sent.query_value("buildNumber"), Some("20240101.1"));
        assert_eq!(sent.query_value("resultFilter"), None);
        assert_eq!(sent.query_value("$top"), Some("5"));
        assert!(logs_contain("qualifier value rejected"));
    }

    #[tokio::test]
    async fn non_numeric_build_id_is_no_row() {
        let (client, transport) = MemoryTransport::new().into_client("contoso");

        let quals = Quals::new().with("id", "latest").with("project_id", "P1");
        assert!(BuildTable.get(&client, &quals).await.unwrap().is_none());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn server_error_on_get_is_remote_api() {
        let (client, _) = MemoryTransport::new()
            .fail("P1/_apis/build/builds/7", None, 500)
            .into_client("contoso");

        let quals = Quals::new().with("id", 7i64).with("project_id", "P1");
        let err = BuildTable.get(&client, &quals).await.unwrap_err();
        assert!(matches!(err, EngineError::RemoteApi { .. }));
        assert!(err.to_string().contains("azuredevops_build.get_build"));
    }
}
