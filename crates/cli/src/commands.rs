use crate::error::CliError;
use clap::{Args, Subcommand};
use engine_core::{error::EngineError, table::TableSchema};
use model::core::{
    data_type::ColumnType,
    qualifier::{QualExpr, Quals},
    value::Value,
};

#[derive(Subcommand)]
pub enum Commands {
    /// List the tables the connector exposes
    Tables,
    /// Show the columns and key qualifiers of a table
    Describe {
        table: String,

        #[arg(long, help = "Print the schema as JSON")]
        json: bool,
    },
    /// List rows of a table
    Query {
        table: String,

        #[command(flatten)]
        selection: Selection,

        #[arg(long, help = "Stop after this many rows")]
        limit: Option<u64>,
    },
    /// Fetch one row by the table's get keys
    Get {
        table: String,

        #[command(flatten)]
        selection: Selection,
    },
    /// Check the connection settings against the organization
    TestConn,
}

#[derive(Args, Debug, Default)]
pub struct Selection {
    #[arg(
        long = "where",
        value_name = "COLUMN=VALUE",
        help = "Equality qualifier; may be repeated"
    )]
    pub quals: Vec<QualExpr>,

    #[arg(long, value_delimiter = ',', help = "Comma-separated columns to print")]
    pub columns: Vec<String>,

    #[arg(long, help = "Print one JSON object per row")]
    pub json: bool,
}

impl Selection {
    /// Qualifiers typed by the table's column types. A literal that does not
    /// fit its column type is passed on as text.
    pub fn quals(&self, schema: &TableSchema) -> Result<Quals, CliError> {
        let mut quals = Quals::new();
        for expr in &self.quals {
            let column = schema.column(&expr.column).ok_or_else(|| EngineError::UnknownColumn {
                table: schema.name.to_string(),
                column: expr.column.clone(),
            })?;
            quals.insert(expr.column.clone(), typed_literal(column.column_type, &expr.value));
        }
        Ok(quals)
    }
}

fn typed_literal(column_type: ColumnType, literal: &str) -> Value {
    let text = Value::from(literal);
    match column_type {
        ColumnType::Int => text.as_i64().map(Value::from).unwrap_or(text),
        ColumnType::Bool => text.as_bool().map(Value::from).unwrap_or(text),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::plugin::catalog;
    use engine_core::catalog::DynTable;

    fn schema(table: &str) -> TableSchema {
        catalog().table(table).unwrap().schema().clone()
    }

    fn selection(exprs: &[&str]) -> Selection {
        Selection {
            quals: exprs.iter().map(|e| e.parse().unwrap()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn literals_follow_column_types() {
        let quals = selection(&["id=42", "deleted=true", "build_number=42", "project_id=P1"])
            .quals(&schema("azuredevops_build"))
            .unwrap();

        assert_eq!(quals.get("id"), Some(&Value::Int(42)));
        assert_eq!(quals.get("deleted"), Some(&Value::Boolean(true)));
        assert_eq!(quals.get("build_number"), Some(&Value::from("42")));
    }

    #[test]
    fn unparsable_literal_stays_text() {
        let quals = selection(&["id=abc"])
            .quals(&schema("azuredevops_build"))
            .unwrap();
        assert_eq!(quals.get("id"), Some(&Value::from("abc")));
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = selection(&["colour=red"])
            .quals(&schema("azuredevops_team"))
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::UnknownColumn { column, .. }) if column == "colour"
        ));
    }
}
