//! The Azure DevOps tables. Each provider declares its columns against a
//! typed row and drives the generic list engine with the endpoints it reads.

use engine_core::table::{Column, ExtractContext, ExtractError};
use model::core::{data_type::ColumnType, value::Value};

pub mod account;
pub mod build;
pub mod build_definition;
pub mod dashboard;
pub mod git_repository;
pub mod git_repository_branch;
pub mod graph;
pub mod group;
pub mod pipeline;
pub mod project;
pub mod release;
pub mod service_endpoint;
pub mod team;
pub mod team_member;
pub mod user;

pub use account::AccountTable;
pub use build::BuildTable;
pub use build_definition::BuildDefinitionTable;
pub use dashboard::DashboardTable;
pub use git_repository::GitRepositoryTable;
pub use git_repository_branch::GitRepositoryBranchTable;
pub use group::GroupTable;
pub use pipeline::PipelineTable;
pub use project::ProjectTable;
pub use release::ReleaseTable;
pub use service_endpoint::ServiceEndpointTable;
pub use team::TeamTable;
pub use team_member::TeamMemberTable;
pub use user::UserTable;

/// Reads an optional field into a column value; `None` becomes null.
pub(crate) fn cell<T: Clone + Into<Value>>(field: &Option<T>) -> Result<Value, ExtractError> {
    Ok(field.clone().into())
}

/// The `organization` column shared by several tables.
pub(crate) fn organization_column<R>() -> Column<R> {
    Column::new(
        "organization",
        ColumnType::String,
        "The name of the organization.",
        organization,
    )
}

fn organization<R>(_: &R, ctx: &ExtractContext<'_>) -> Result<Value, ExtractError> {
    Ok(ctx.organization.map(str::to_string).into())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use model::core::qualifier::Quals;
    use model::records::row::RowData;

    /// Extracts every column of `row`, the way the projection does for a full scan.
    pub(crate) fn extract_all<R>(
        table: &str,
        columns: &[Column<R>],
        row: &R,
        organization: Option<&str>,
    ) -> RowData {
        let quals = Quals::new();
        let ctx = ExtractContext {
            organization,
            quals: &quals,
        };
        let fields = columns
            .iter()
            .map(|c| {
                let value = (c.extract)(row, &ctx).unwrap();
                model::core::value::FieldValue::new(c.schema.name, value)
            })
            .collect();
        RowData::new(table, fields)
    }

    #[test]
    fn organization_column_reads_the_connection() {
        let column = organization_column::<()>();
        let quals = Quals::new();
        let ctx = ExtractContext {
            organization: Some("contoso"),
            quals: &quals,
        };
        assert_eq!((column.extract)(&(), &ctx).unwrap(), Value::from("contoso"));

        let detached = ExtractContext {
            organization: None,
            quals: &quals,
        };
        assert!((column.extract)(&(), &detached).unwrap().is_null());
    }
}
