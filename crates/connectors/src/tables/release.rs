use super::{cell, organization_column};
use crate::{
    client::{Collection, CursorStyle, DevOpsClient, Single},
    resources::release::Release,
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::{lookup, require_keys},
    paginate::paginate,
    table::{Column, KeyColumns, TableProvider, json},
    translate::{Conversion, FilterMapping, translate},
};
use model::core::{data_type::ColumnType, qualifier::Quals};
use tracing::debug;

pub const TABLE: &str = "azuredevops_release";

const LIST_RELEASES: Operation = Operation::new(TABLE, "list_releases");
const GET_RELEASE: Operation = Operation::new(TABLE, "get_release");

pub const RELEASE_STATUSES: &[&str] = &["undefined", "draft", "active", "abandoned"];

const FILTERS: &[FilterMapping] = &[
    FilterMapping::text("name", "searchText"),
    FilterMapping::new("status", "statusFilter", Conversion::Enum(RELEASE_STATUSES)),
    FilterMapping::new("id", "releaseIdFilter", Conversion::Integer),
];

type Col = Column<Release>;

pub struct ReleaseTable;

#[async_trait]
impl TableProvider<DevOpsClient> for ReleaseTable {
    type Row = Release;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Release"
    }

    fn columns(&self) -> Vec<Column<Release>> {
        vec![
            organization_column(),
            Col::new(
                "id",
                ColumnType::Int,
                "Gets the unique identifier of this release.",
                |r, _| cell(&r.id),
            ),
            Col::new("name", ColumnType::String, "The release name.", |r, _| cell(&r.name)),
            Col::new("status", ColumnType::String, "The release status.", |r, _| {
                cell(&r.status)
            }),
            Col::new(
                "project_id",
                ColumnType::String,
                "ID of the project this release belongs to.",
                |r, _| cell(&r.project_reference.as_ref().and_then(|p| p.id.clone())),
            ),
            Col::new("comment", ColumnType::String, "Gets comment.", |r, _| {
                cell(&r.comment)
            }),
            Col::new(
                "created_on",
                ColumnType::Timestamp,
                "Gets date on which it got created.",
                |r, _| cell(&r.created_on),
            ),
            Col::new(
                "definition_snapshot_revision",
                ColumnType::Int,
                "Gets revision number of definition snapshot.",
                |r, _| cell(&r.definition_snapshot_revision),
            ),
            Col::new(
                "description",
                ColumnType::String,
                "Gets description of release.",
                |r, _| cell(&r.description),
            ),
            Col::new(
                "keep_forever",
                ColumnType::Bool,
                "Whether to exclude the release from retention policies.",
                |r, _| cell(&r.keep_forever),
            ),
            Col::new(
                "logs_container_url",
                ColumnType::String,
                "Gets logs container url.",
                |r, _| cell(&r.logs_container_url),
            ),
            Col::new(
                "modified_on",
                ColumnType::Timestamp,
                "Gets date on which it got modified.",
                |r, _| cell(&r.modified_on),
            ),
            Col::new("pool_name", ColumnType::String, "Gets pool name.", |r, _| {
                cell(&r.pool_name)
            }),
            Col::new("reason", ColumnType::String, "Gets reason of release.", |r, _| {
                cell(&r.reason)
            }),
            Col::new(
                "release_definition_revision",
                ColumnType::Int,
                "Gets the release definition revision.",
                |r, _| cell(&r.release_definition_revision),
            ),
            Col::new(
                "release_name_format",
                ColumnType::String,
                "Gets release name format.",
                |r, _| cell(&r.release_name_format),
            ),
            Col::new(
                "triggering_artifact_alias",
                ColumnType::String,
                "Gets triggering artifact alias.",
                |r, _| cell(&r.triggering_artifact_alias),
            ),
            Col::new("artifacts", ColumnType::Json, "Gets the list of artifacts.", |r, _| {
                cell(&r.artifacts)
            }),
            Col::new("created_by", ColumnType::Json, "Gets the identity who created.", |r, _| {
                cell(&r.created_by)
            }),
            Col::new(
                "created_for",
                ColumnType::Json,
                "Gets the identity for whom release was created.",
                |r, _| cell(&r.created_for),
            ),
            Col::new(
                "environments",
                ColumnType::Json,
                "Gets list of environments.",
                |r, _| cell(&r.environments),
            ),
            Col::new(
                "links",
                ColumnType::Json,
                "The class to represent a collection of REST reference links.",
                |r, _| cell(&r.links),
            ),
            Col::new(
                "modified_by",
                ColumnType::Json,
                "Gets the identity who modified.",
                |r, _| cell(&r.modified_by),
            ),
            Col::new(
                "project_reference",
                ColumnType::Json,
                "Gets project reference.",
                |r, _| json(&r.project_reference),
            ),
            Col::new("properties", ColumnType::Json, "The release properties.", |r, _| {
                cell(&r.properties)
            }),
            Col::new(
                "release_definition",
                ColumnType::Json,
                "Gets releaseDefinitionReference which specifies the reference of the release definition to which this release is associated.",
                |r, _| cell(&r.release_definition),
            ),
            Col::new("tags", ColumnType::Json, "Gets list of tags.", |r, _| cell(&r.tags)),
            Col::new(
                "variable_groups",
                ColumnType::Json,
                "Gets the list of variable groups.",
                |r, _| cell(&r.variable_groups),
            ),
            Col::new(
                "variables",
                ColumnType::Json,
                "Gets or sets the dictionary of variables.",
                |r, _| cell(&r.variables),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["project_id", "name", "status", "id"])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id", "project_id"])
    }

    /// Releases are listed organization-wide, or under one project when
    /// `project_id` is qualified. The service pages them with an integer token.
    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, Release>,
    ) -> Result<Flow, EngineError> {
        let mut path = vec!["_apis", "release", "releases"];
        let project_id = quals.get_str("project_id");
        if let Some(project_id) = project_id.as_deref() {
            path.insert(0, project_id);
        }

        let request = ApiRequest::new(ApiHost::Release, path, "7.1")
            .params(translate(&LIST_RELEASES, quals, FILTERS));
        let releases = Collection::<Release>::new(request)
            .paged_by("$top")
            .cursor(CursorStyle::Numeric);
        paginate(client, &LIST_RELEASES, &releases, emitter).await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<Release>, EngineError> {
        let Some([id, project_id]) = require_keys(quals, ["id", "project_id"]) else {
            return Ok(None);
        };
        if id.parse::<i64>().is_err() {
            debug!(table = TABLE, id = %id, "release id is not an integer");
            return Ok(None);
        }
        let request = ApiRequest::new(
            ApiHost::Release,
            [project_id.as_str(), "_apis", "release", "releases", id.as_str()],
            "7.1",
        );
        lookup(client, &GET_RELEASE, &Single::new(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use serde_json::json;

    #[tokio::test]
    async fn numeric_token_walks_until_zero() {
        let (client, transport) = MemoryTransport::new()
            .page(
                "_apis/release/releases",
                None,
                vec![json!({"id": 30, "name": "Release-30"})],
                Some("29"),
            )
            .page(
                "_apis/release/releases",
                Some("29"),
                vec![json!({"id": 29, "name": "Release-29"})],
                Some("0"),
            )
            .into_client("contoso");

        let mut rows: Vec<Release> = Vec::new();
        let mut emitter = RowEmitter::<Release>::new(&mut rows, None, Default::default());
        ReleaseTable
            .list(&client, &Quals::new(), &mut emitter)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.requests()[0].host, ApiHost::Release);
    }

    #[tokio::test]
    async fn project_qualifier_scopes_the_path() {
        let (client, transport) = MemoryTransport::new()
            .page("P1/_apis/release/releases", None, vec![], None)
            .into_client("contoso");

        let quals = Quals::new()
            .with("project_id", "P1")
            .with("status", "Active")
            .with("id", "not-a-number");
        let mut rows: Vec<Release> = Vec::new();
        let mut emitter = RowEmitter::<Release>::new(&mut rows, Some(20), Default::default());
        ReleaseTable.list(&client, &quals, &mut emitter).await.unwrap();

        let sent = &transport.requests_to("P1/_apis/release/releases")[0];
        assert_eq!(sent.query_value("statusFilter"), Some("active"));
        assert_eq!(sent.query_value("releaseIdFilter"), None);
        assert_eq!(sent.query_value("$top"), Some("20"));
    }
}
