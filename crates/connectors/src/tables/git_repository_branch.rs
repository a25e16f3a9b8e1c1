use super::{cell, git_repository};
use crate::{
    client::{Collection, CursorStyle, DevOpsClient, Single},
    resources::{Scoped, git::GitBranchStats},
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

pub const TABLE: &str = "azuredevops_git_repository_branch";

const LIST_BRANCHES: Operation = Operation::new(TABLE, "list_git_repository_branches");
const GET_BRANCH: Operation = Operation::new(TABLE, "get_git_repository_branch");

type BranchRow = Scoped<GitBranchStats>;
type Col = Column<BranchRow>;

fn branch_stats(repository_id: &str) -> ApiRequest {
    ApiRequest::new(
        ApiHost::Organization,
        ["_apis", "git", "repositories", repository_id, "stats", "branches"],
        "7.1",
    )
}

pub struct GitRepositoryBranchTable;

#[async_trait]
impl TableProvider<DevOpsClient> for GitRepositoryBranchTable {
    type Row = BranchRow;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn description(&self) -> &'static str {
        "Azure DevOps Git Repository Branch"
    }

    fn columns(&self) -> Vec<Col> {
        vec![
            Col::new("name", ColumnType::String, "Name of the ref.", |r, _| {
                cell(&r.resource.name)
            }),
            Col::new("repository_id", ColumnType::String, "The repository id.", |r, _| {
                Ok(r.parent_id.clone().into())
            }),
            Col::new("ahead_count", ColumnType::Int, "Number of commits ahead.", |r, _| {
                cell(&r.resource.ahead_count)
            }),
            Col::new("behind_count", ColumnType::Int, "Number of commits behind.", |r, _| {
                cell(&r.resource.behind_count)
            }),
            Col::new(
                "is_base_version",
                ColumnType::Bool,
                "True if this is the result for the base version.",
                |r, _| cell(&r.resource.is_base_version),
            ),
            Col::new("commit", ColumnType::Json, "Current commit.", |r, _| {
                cell(&r.resource.commit)
            }),
            Col::new("title", ColumnType::String, "Title of the resource.", |r, _| {
                cell(&r.resource.name)
            }),
        ]
    }

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&["repository_id"])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        Some(&["name", "repository_id"])
    }

    async fn list(
        &self,
        client: &DevOpsClient,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, BranchRow>,
    ) -> Result<Flow, EngineError> {
        chain(
            client,
            &git_repository::LIST_REPOSITORIES,
            &git_repository::list_repositories(None),
            &git_repository::REPOSITORY_SCOPE,
            quals,
            &LIST_BRANCHES,
            |_, repository_id| {
                Collection::<GitBranchStats>::new(branch_stats(&repository_id))
                    .cursor(CursorStyle::None)
                    .map_rows(move |branch| Scoped::new(repository_id.clone(), branch))
            },
            emitter,
        )
        .await
    }

    async fn get(&self, client: &DevOpsClient, quals: &Quals) -> Result<Option<BranchRow>, EngineError> {
        let Some([name, repository_id]) = require_keys(quals, ["name", "repository_id"]) else {
            return Ok(None);
        };
        let request = branch_stats(&repository_id).param("name", name);
        let branch: Option<GitBranchStats> =
            lookup(client, &GET_BRANCH, &Single::new(request)).await?;
        Ok(branch.map(|branch| Scoped::new(repository_id, branch)))
    }
}
