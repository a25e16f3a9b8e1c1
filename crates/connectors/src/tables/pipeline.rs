use super::{cell, organization_column, project};
use crate::{
    client::{Collection, DevOpsClient, Single},
    resources::{Scoped, pipeline::Pipeline},
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
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use tracing::debug;

pub const TABLE: &str = "azuredevops_pipeline";

const LIST_PIPELINES: Operation = Operation::new(TABLE, "list_pipelines");
const GET_PIPELINE: Operation = Operation::new(TABLE, "get_pipeline");

type PipelineRow = Scoped<Pipeline>;
type Col = Column<PipelineRow>;

pub struct PipelineTable;

#[async_trait]
impl TableProvider<DevOpsClient> for PipelineTable {
    type Row = PipelineRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Pipeline"
    }

    fn columns(&self) -> Vec<Col> {
        vec![
            organization_column(),
            Col::new("id", ColumnType::Int, "Pipeline ID.", |r, _| cell(&r.resource.id)),
            Col::new("name", ColumnType::String, "Pipeline name.", |r, _| {
                cell(&r.resource.name)
            }),
            Col::new(
                "project_id",
                ColumnType::String,
                "ID of the project this pipeline belongs to.",
                |r, _| Ok(r.parent_id.clone().into()),
            ),
            Col::new(
                "configuration_type",
                ColumnType::String,
                "Type of the pipeline configuration.",
                |r, _| {
                    cell(
                        &r.resource
                            .configuration
                            .as_ref()
                            .and_then(|c| c.kind.clone()),
                    )
                },
            ),
            Col::new("folder", ColumnType::String, "Pipeline folder.", |r, _| {
                cell(&r.resource.folder)
            }),
            Col::new("revision", ColumnType::String, "Revision number.", |r, _| {
                cell(&r.resource.revision)
            }),
            Col::new("url", ColumnType::String, "URL of the pipeline.", |r, _| {
                cell(&r.resource.url)
            }),
            Col::new(
                "links",
                ColumnType::Json,
                "The class to represent a collection of REST reference links.",
                |r, _| cell(&r.resource.links),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.resource.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["project_id"])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id", "project_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, PipelineRow>,
    ) -> Result<Flow, EngineError> {
        chain(
            client,
            &project::LIST_PROJECTS,
            &project::list_projects(Vec::new()),
            &project::PROJECT_SCOPE,
            quals,
            &LIST_PIPELINES,
            |_, project_id| {
                let request = ApiRequest::new(
                    ApiHost::Organization,
                    [project_id.as_str(), "_apis", "pipelines"],
                    "7.1",
                );
                Collection::<Pipeline>::new(request)
                    .paged_by("$top")
                    .map_rows(move |pipeline| Scoped::new(project_id.clone(), pipeline))
            },
            emitter,
        )
        .await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<PipelineRow>, EngineError> {
        let Some([id, project_id]) = require_keys(quals, ["id", "project_id"]) else {
            return Ok(None);
        };
        if id.parse::<i64>().is_err() {
            debug!(table = TABLE, id = %id, "pipeline id is not an integer");
            return Ok(None);
        }
        let request = ApiRequest::new(
            ApiHost::Organization,
            [project_id.as_str(), "_apis", "pipelines", id.as_str()],
            "7.1",
        );
        let pipeline: Option<Pipeline> = lookup(client, &GET_PIPELINE, &Single::new(request)).await?;
        Ok(pipeline.map(|pipeline| Scoped::new(project_id, pipeline)))
    }
}
