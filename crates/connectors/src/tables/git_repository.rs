use super::cell;
use crate::{
    client::{Collection, CursorStyle, DevOpsClient, Single},
    resources::git::GitRepository,
    transport::{ApiHost, ApiRequest},
};
use async_trait::async_trait;
use engine_core::{
    Operation,
    chain::ParentScope,
    emitter::{Flow, RowEmitter},
    error::EngineError,
    lookup::{lookup, require_keys},
    paginate::paginate,
    table::{Column, KeyColumns, TableProvider, json},
};
use model::core::{data_type::ColumnType, qualifier::Quals};

pub const TABLE: &str = "azuredevops_git_repository";

pub(crate) const LIST_REPOSITORIES: Operation = Operation::new(TABLE, "list_git_repositories");
const GET_REPOSITORY: Operation = Operation::new(TABLE, "get_git_repository");

/// Tables listed per repository scope their rows with this.
pub(crate) const REPOSITORY_SCOPE: ParentScope<GitRepository> =
    ParentScope::new("repository_id", |repository| repository.id.clone());

/// Repositories of one project, or of the whole organization.
pub(crate) fn list_repositories(project_id: Option<&str>) -> Collection<GitRepository> {
    let mut path = vec!["_apis", "git", "repositories"];
    if let Some(project_id) = project_id {
        path.insert(0, project_id);
    }
    let request = ApiRequest::new(ApiHost::Organization, path, "7.1")
        .param("includeLinks", true)
        .param("includeAllUrls", true);
    Collection::new(request).cursor(CursorStyle::None)
}

type Col = Column<GitRepository>;

pub struct GitRepositoryTable;

#[async_trait]
impl TableProvider<DevOpsClient> for GitRepositoryTable {
    type Row = GitRepository;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Git Repository"
    }

    fn columns(&self) -> Vec<Column<GitRepository>> {
        vec![
            Col::new("id", ColumnType::String, "The repository id.", |r, _| cell(&r.id)),
            Col::new("name", ColumnType::String, "The repository name.", |r, _| {
                cell(&r.name)
            }),
            Col::new(
                "default_branch",
                ColumnType::String,
                "The repository default branch.",
                |r, _| cell(&r.default_branch),
            ),
            Col::new(
                "is_fork",
                ColumnType::Bool,
                "True if the repository was created as a fork.",
                |r, _| cell(&r.is_fork),
            ),
            Col::new("project_id", ColumnType::String, "The project Id.", |r, _| {
                cell(&r.project.as_ref().and_then(|p| p.id.clone()))
            }),
            Col::new("remote_url", ColumnType::String, "The repository remote url.", |r, _| {
                cell(&r.remote_url)
            }),
            Col::new(
                "size",
                ColumnType::String,
                "Compressed size (bytes) of the repository.",
                |r, _| cell(&r.size),
            ),
            Col::new("ssh_url", ColumnType::String, "The repository ssh url.", |r, _| {
                cell(&r.ssh_url)
            }),
            Col::new("url", ColumnType::String, "The repository url.", |r, _| cell(&r.url)),
            Col::new("web_url", ColumnType::String, "The repository web url.", |r, _| {
                cell(&r.web_url)
            }),
            Col::new(
                "links",
                ColumnType::Json,
                "The class to represent a collection of REST reference links.",
                |r, _| cell(&r.links),
            ),
            Col::new(
                "parent_repository",
                ColumnType::Json,
                "The parent repository.",
                |r, _| cell(&r.parent_repository),
            ),
            Col::new(
                "project",
                ColumnType::Json,
                "The project this repository belongs to.",
                |r, _| json(&r.project),
            ),
            Col::new(
                "valid_remote_urls",
                ColumnType::Json,
                "The repository valid remote urls.",
                |r, _| cell(&r.valid_remote_urls),
            ),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["project_id"])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, GitRepository>,
    ) -> Result<Flow, EngineError> {
        let project_id = quals.get_str("project_id");
        let repositories = list_repositories(project_id.as_deref());
        paginate(client, &LIST_REPOSITORIES, &repositories, emitter).await
    }

    async fn get(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
    ) -> Result<Option<GitRepository>, EngineError> {
        let Some([id]) = require_keys(quals, ["id"]) else {
            return Ok(None);
        };
        let request = ApiRequest::new(
            ApiHost::Organization,
            ["_apis", "git", "repositories", id.as_str()],
            "7.1",
        );
        lookup(client, &GET_REPOSITORY, &Single::new(request)).await
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
    async fn size_is_reported_as_text() {
        let (client, _) = MemoryTransport::new()
            .page(
                "_apis/git/repositories",
                None,
                vec![json!({"id": "r1", "name": "app", "size": 2048, "project": {"id": "P1", "name": "Alpha"}})],
                None,
            )
            .into_client("contoso");
        let table = TableAdapter::new(GitRepositoryTable);

        let mut rows: Vec<RowData> = Vec::new();
        table
            .scan(&client, &ScanRequest::new(Quals::new()), &mut rows)
            .await
            .unwrap();

        assert_eq!(rows[0].get_value("size"), Value::from("2048"));
        assert_eq!(rows[0].get_value("project_id"), Value::from("P1"));
        assert_eq!(
            rows[0].get_value("project"),
            Value::from(json!({"id": "P1", "name": "Alpha"}))
        );
    }

    #[tokio::test]
    async fn empty_id_get_sends_nothing() {
        let (client, transport) = MemoryTransport::new().into_client("contoso");
        let table = TableAdapter::new(GitRepositoryTable);

        let mut rows: Vec<RowData> = Vec::new();
        let request = ScanRequest::new(Quals::new().with("id", ""));
        let emitted = table.scan(&client, &request, &mut rows).await.unwrap();

        assert_eq!(emitted, 0);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn project_qualifier_moves_into_the_path() {
        let (client, transport) = MemoryTransport::new()
            .page("P1/_apis/git/repositories", None, vec![json!({"id": "r1"})], None)
            .into_client("contoso");
        let table = TableAdapter::new(GitRepositoryTable);

        let mut rows: Vec<RowData> = Vec::new();
        let request = ScanRequest::new(Quals::new().with("project_id", "P1"));
        table.scan(&client, &request, &mut rows).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            transport.requests()[0].query_value("includeAllUrls"),
            Some("true")
        );
    }
}
