use super::{cell, project};
use crate::{
    client::{Collection, DevOpsClient, Single},
    resources::build::{BuildDefinition, BuildDefinitionReference, BuildDefinitionRow},
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
    table::{Column, KeyColumns, TableProvider, json},
    translate::{Conversion, FilterMapping, translate},
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use tracing::debug;

pub const TABLE: &str = "azuredevops_build_definition";

const LIST_DEFINITIONS: Operation = Operation::new(TABLE, "list_build_definitions");
const GET_DEFINITION: Operation = Operation::new(TABLE, "get_build_definition");

const HYDRATE_DEFINITION: &str = "get_definition";

const FILTERS: &[FilterMapping] = &[
    FilterMapping::new("id", "definitionIds", Conversion::Integer),
    FilterMapping::text("name", "name"),
    FilterMapping::text("repository_id", "repositoryId"),
    FilterMapping::text("repository_type", "repositoryType"),
    FilterMapping::text("path", "path"),
];

type Col = Column<BuildDefinitionRow>;

/// Reads a field that only the full definition carries.
macro_rules! detail {
    ($row:expr, $field:ident) => {
        cell(&$row.detail.as_ref().and_then(|d| d.$field.clone()))
    };
}

pub struct BuildDefinitionTable;

impl BuildDefinitionTable {
    async fn fetch_definition(
        client: &DevOpsClient,
        project_id: &str,
        id: &str,
    ) -> Result<Option<BuildDefinition>, EngineError> {
        let request = ApiRequest::new(
            ApiHost::Organization,
            [project_id, "_apis", "build", "definitions", id],
            "7.1",
        );
        lookup(client, &GET_DEFINITION, &Single::new(request)).await
    }
}

#[async_trait]
impl TableProvider<DevOpsClient> for BuildDefinitionTable {
    type Row = BuildDefinitionRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Build Definition"
    }

    fn columns(&self) -> Vec<Column<BuildDefinitionRow>> {
        vec![
            Col::new("id", ColumnType::Int, "The ID of the referenced definition.", |r, _| {
                cell(&r.definition.id)
            }),
            Col::new(
                "name",
                ColumnType::String,
                "The name of the referenced definition.",
                |r, _| cell(&r.definition.name),
            ),
            Col::new(
                "quality",
                ColumnType::String,
                "The quality of the definition document (draft, etc.).",
                |r, _| cell(&r.definition.quality),
            ),
            Col::new("project_id", ColumnType::String, "ID of the project.", |r, _| {
                cell(&r.definition.project.as_ref().and_then(|p| p.id.clone()))
            }),
            Col::hydrated(
                "repository_id",
                ColumnType::String,
                "ID of the repository.",
                HYDRATE_DEFINITION,
                |r, _| {
                    cell(
                        &r.detail
                            .as_ref()
                            .and_then(|d| d.repository.as_ref())
                            .and_then(|repo| repo.id.clone()),
                    )
                },
            ),
            Col::hydrated(
                "badge_enabled",
                ColumnType::Bool,
                "Indicates whether badges are enabled for this definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, badge_enabled),
            ),
            Col::hydrated(
                "build_number_format",
                ColumnType::String,
                "The build number format.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, build_number_format),
            ),
            Col::hydrated(
                "comment",
                ColumnType::String,
                "A save-time comment for the definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, comment),
            ),
            Col::new(
                "created_date",
                ColumnType::Timestamp,
                "The date this version of the definition was created.",
                |r, _| cell(&r.definition.created_date),
            ),
            Col::hydrated(
                "description",
                ColumnType::String,
                "The description.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, description),
            ),
            Col::hydrated(
                "drop_location",
                ColumnType::String,
                "The drop location for the definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, drop_location),
            ),
            Col::hydrated(
                "job_authorization_scope",
                ColumnType::String,
                "The job authorization scope for builds queued against this definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, job_authorization_scope),
            ),
            Col::hydrated(
                "job_cancel_timeout_in_minutes",
                ColumnType::Int,
                "The job cancel timeout (in minutes) for builds cancelled by user for this definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, job_cancel_timeout_in_minutes),
            ),
            Col::hydrated(
                "job_timeout_in_minutes",
                ColumnType::Int,
                "The job execution timeout (in minutes) for builds queued against this definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, job_timeout_in_minutes),
            ),
            Col::new("path", ColumnType::String, "The folder path of the definition.", |r, _| {
                cell(&r.definition.path)
            }),
            Col::new(
                "queue_status",
                ColumnType::String,
                "A value that indicates whether builds can be queued against this definition.",
                |r, _| cell(&r.definition.queue_status),
            ),
            Col::hydrated(
                "repository_type",
                ColumnType::String,
                "Type of the repository.",
                HYDRATE_DEFINITION,
                |r, _| {
                    cell(
                        &r.detail
                            .as_ref()
                            .and_then(|d| d.repository.as_ref())
                            .and_then(|repo| repo.kind.clone()),
                    )
                },
            ),
            Col::new("revision", ColumnType::Int, "The definition revision number.", |r, _| {
                cell(&r.definition.revision)
            }),
            Col::new("type", ColumnType::String, "The type of the definition.", |r, _| {
                cell(&r.definition.kind)
            }),
            Col::new("uri", ColumnType::String, "The definition's URI.", |r, _| {
                cell(&r.definition.uri)
            }),
            Col::new("url", ColumnType::String, "The REST URL of the definition.", |r, _| {
                cell(&r.definition.url)
            }),
            Col::new("authored_by", ColumnType::Json, "The author of the definition.", |r, _| {
                cell(&r.definition.authored_by)
            }),
            Col::hydrated(
                "demands",
                ColumnType::Json,
                "A list of demands that represents the agent capabilities required by this build.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, demands),
            ),
            Col::new(
                "draft_of",
                ColumnType::Json,
                "A reference to the definition that this definition is a draft of, if this is a draft definition.",
                |r, _| cell(&r.definition.draft_of),
            ),
            Col::new(
                "drafts",
                ColumnType::Json,
                "The list of drafts associated with this definition, if this is not a draft definition.",
                |r, _| cell(&r.definition.drafts),
            ),
            Col::new("latest_build", ColumnType::Json, "Data representation of a build.", |r, _| {
                cell(&r.definition.latest_build)
            }),
            Col::new(
                "latest_completed_build",
                ColumnType::Json,
                "Data representation of a latest completed build.",
                |r, _| cell(&r.definition.latest_completed_build),
            ),
            Col::new(
                "links",
                ColumnType::Json,
                "The class to represent a collection of REST reference links.",
                |r, _| cell(&r.definition.links),
            ),
            Col::new(
                "metrics",
                ColumnType::Json,
                "Represents metadata about builds in the system.",
                |r, _| cell(&r.definition.metrics),
            ),
            Col::hydrated(
                "options",
                ColumnType::Json,
                "Represents the application of an optional behavior to a build definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, options),
            ),
            Col::hydrated(
                "process",
                ColumnType::Json,
                "The build process.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, process),
            ),
            Col::hydrated(
                "process_parameters",
                ColumnType::Json,
                "The process parameters for this definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, process_parameters),
            ),
            Col::new("project", ColumnType::Json, "A reference to the project.", |r, _| {
                json(&r.definition.project)
            }),
            Col::hydrated(
                "properties",
                ColumnType::Json,
                "The class represents a property bag as a collection of key-value pairs.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, properties),
            ),
            Col::new(
                "queue",
                ColumnType::Json,
                "The default queue for builds run against this definition.",
                |r, _| cell(&r.definition.queue),
            ),
            Col::hydrated(
                "repository",
                ColumnType::Json,
                "The repository.",
                HYDRATE_DEFINITION,
                |r, _| json(&r.detail.as_ref().and_then(|d| d.repository.as_ref())),
            ),
            Col::hydrated(
                "retention_rules",
                ColumnType::Json,
                "Represents a retention policy for a build definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, retention_rules),
            ),
            Col::hydrated(
                "tags",
                ColumnType::Json,
                "The build definition tags.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, tags),
            ),
            Col::hydrated(
                "triggers",
                ColumnType::Json,
                "Represents a trigger for a build definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, triggers),
            ),
            Col::hydrated(
                "variable_groups",
                ColumnType::Json,
                "Represents a variable group.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, variable_groups),
            ),
            Col::hydrated(
                "variables",
                ColumnType::Json,
                "Represents a variable used by a build definition.",
                HYDRATE_DEFINITION,
                |r, _| detail!(r, variables),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.definition.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&[
            "id",
            "name",
            "project_id",
            "repository_id",
            "repository_type",
            "path",
        ])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id", "project_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, BuildDefinitionRow>,
    ) -> Result<Flow, EngineError> {
        let filters = translate(&LIST_DEFINITIONS, quals, FILTERS);
        chain(
            client,
            &project::LIST_PROJECTS,
            &project::list_projects(Vec::new()),
            &project::PROJECT_SCOPE,
            quals,
            &LIST_DEFINITIONS,
            |_, project_id| {
                let request = ApiRequest::new(
                    ApiHost::Organization,
                    [project_id.as_str(), "_apis", "build", "definitions"],
                    "7.1",
                )
                .param("includeAllProperties", true)
                .param("includeLatestBuilds", true)
                .params(filters.clone());
                Collection::<BuildDefinitionReference>::new(request)
                    .paged_by("$top")
                    .map_rows(BuildDefinitionRow::from)
            },
            emitter,
        )
        .await
    }

    async fn get(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
    ) -> Result<Option<BuildDefinitionRow>, EngineError> {
        let Some([id, project_id]) = require_keys(quals, ["id", "project_id"]) else {
            return Ok(None);
        };
        if id.parse::<i64>().is_err() {
            debug!(table = TABLE, id = %id, "definition id is not an integer");
            return Ok(None);
        }
        Ok(Self::fetch_definition(client, &project_id, &id)
            .await?
            .map(BuildDefinitionRow::from))
    }

    async fn hydrate(
        &self,
        client: &DevOpsClient,
        mut row: BuildDefinitionRow,
        steps: &[&'static str],
    ) -> Result<BuildDefinitionRow, EngineError> {
        if !steps.contains(&HYDRATE_DEFINITION) || row.detail.is_some() {
            return Ok(row);
        }
        let project_id = row.definition.project.as_ref().and_then(|p| p.id.clone());
        let (Some(project_id), Some(id)) = (project_id, row.definition.id) else {
            return Ok(row);
        };

        if let Some(definition) =
            Self::fetch_definition(client, &project_id, &id.to_string()).await?
        {
            row.detail = Some(definition.detail);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use engine_core::catalog::{DynTable, ScanRequest, TableAdapter};
    use model::{core::value::Value, records::row::RowData};
    use serde_json::json;

    fn transport() -> MemoryTransport {
        MemoryTransport::new()
            .page("_apis/projects", None, vec![json!({"id": "P1"})], None)
            .page(
                "P1/_apis/build/definitions",
                None,
                vec![
                    json!({"id": 1, "name": "CI", "project": {"id": "P1"}}),
                    json!({"id": 2, "name": "Nightly", "project": {"id": "P1"}}),
                ],
                Some("c2"),
            )
            .page(
                "P1/_apis/build/definitions",
                Some("c2"),
                vec![json!({"id": 3, "name": "Release", "project": {"id": "P1"}})],
                None,
            )
    }

    #[tokio::test]
    async fn listing_without_detail_columns_skips_the_per_row_fetch() {
        let (client, transport) = transport().into_client("contoso");
        let table = TableAdapter::new(BuildDefinitionTable);

        let mut rows: Vec<RowData> = Vec::new();
        let request = ScanRequest::new(Quals::new()).with_columns(["id", "name"]);
        table.scan(&client, &request, &mut rows).await.unwrap();

        let names: Vec<Value> = rows.iter().map(|r| r.get_value("name")).collect();
        assert_eq!(
            names,
            vec![Value::from("CI"), Value::from("Nightly"), Value::from("Release")]
        );
        let pages = transport.requests_to("P1/_apis/build/definitions");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].query_value("includeLatestBuilds"), Some("true"));
        assert_eq!(pages[1].query_value("continuationToken"), Some("c2"));
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn detail_columns_fetch_each_definition() {
        let (client, transport) = transport()
            .entity(
                "P1/_apis/build/definitions/1",
                json!({"id": 1, "repository": {"id": "r1", "type": "TfsGit"}, "badgeEnabled": true}),
            )
            .into_client("contoso");
        let table = TableAdapter::new(BuildDefinitionTable);

        let mut rows: Vec<RowData> = Vec::new();
        let request = ScanRequest::new(Quals::new())
            .with_columns(["repository_type", "badge_enabled"])
            .with_limit(Some(1));
        table.scan(&client, &request, &mut rows).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_value("repository_type"), Value::from("TfsGit"));
        assert_eq!(rows[0].get_value("badge_enabled"), Value::from(true));
        assert_eq!(transport.requests_to("P1/_apis/build/definitions/1").len(), 1);
        assert_eq!(transport.requests_to("P1/_apis/build/definitions").len(), 1);
    }
}
