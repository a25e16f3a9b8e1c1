use crate::{
    emitter::{Flow, RowEmitter},
    error::EngineError,
};
use async_trait::async_trait;
use model::core::{data_type::ColumnType, qualifier::Quals, value::Value};
use serde::Serialize;
use thiserror::Error;

/// The client handle a table reads through.
pub trait Connection: Send + Sync + 'static {
    /// Name of the organization the connection points at, when known.
    fn organization(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub column_type: ColumnType,
    /// Per-row fetch that must run before this column can be read.
    pub hydrate: Option<&'static str>,
}

/// Qualifiers a list call understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColumns {
    /// Each column may be supplied to narrow the remote call.
    Optional(&'static [&'static str]),
    /// At least one of the columns must be supplied.
    AnyOf(&'static [&'static str]),
}

impl KeyColumns {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            KeyColumns::Optional(columns) | KeyColumns::AnyOf(columns) => columns,
        }
    }

    pub fn check(&self, table: &str, quals: &Quals) -> Result<(), EngineError> {
        match self {
            KeyColumns::AnyOf(columns) if !columns.iter().any(|c| quals.get_str(c).is_some()) => {
                Err(EngineError::MissingKeyColumns {
                    table: table.to_string(),
                    columns: columns.iter().map(|c| c.to_string()).collect(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub columns: Vec<ColumnSchema>,
    pub list_keys: KeyColumns,
    pub get_keys: Option<&'static [&'static str]>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when every get key appears among the qualifiers.
    pub fn is_point_lookup(&self, quals: &Quals) -> bool {
        self.get_keys
            .is_some_and(|keys| keys.iter().all(|key| quals.contains(key)))
    }
}

/// What an extractor can see besides the row itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub organization: Option<&'a str>,
    pub quals: &'a Quals,
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct ExtractError(pub String);

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError(err.to_string())
    }
}

pub type Extractor<R> = fn(&R, &ExtractContext<'_>) -> Result<Value, ExtractError>;

/// A column bound to the function that reads it off a typed row.
pub struct Column<R> {
    pub schema: ColumnSchema,
    pub extract: Extractor<R>,
}

impl<R> Column<R> {
    pub fn new(
        name: &'static str,
        column_type: ColumnType,
        description: &'static str,
        extract: Extractor<R>,
    ) -> Self {
        Column {
            schema: ColumnSchema {
                name,
                description,
                column_type,
                hydrate: None,
            },
            extract,
        }
    }

    /// A column only readable after the per-row fetch named `step`.
    pub fn hydrated(
        name: &'static str,
        column_type: ColumnType,
        description: &'static str,
        step: &'static str,
        extract: Extractor<R>,
    ) -> Self {
        let mut column = Column::new(name, column_type, description, extract);
        column.schema.hydrate = Some(step);
        column
    }
}

/// Serializes a nested structure into a JSON column value.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Value, ExtractError> {
    Ok(Value::from(serde_json::to_value(value)?))
}

/// A remote resource exposed as a table.
#[async_trait]
pub trait TableProvider<C: Connection>: Send + Sync + 'static {
    type Row: Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn columns(&self) -> Vec<Column<Self::Row>>;

    fn list_keys(&self) -> KeyColumns {
        KeyColumns::Optional(&[])
    }

    fn get_keys(&self) -> Option<&'static [&'static str]> {
        None
    }

    async fn list(
        &self,
        client: &C,
        quals: &Quals,
        emitter: &mut RowEmitter<'_, Self::Row>,
    ) -> Result<Flow, EngineError>;

    async fn get(&self, _client: &C, _quals: &Quals) -> Result<Option<Self::Row>, EngineError> {
        Ok(None)
    }

    /// Runs the named per-row fetches. Only called with steps that a
    /// requested column declares.
    async fn hydrate(
        &self,
        _client: &C,
        row: Self::Row,
        _steps: &[&'static str],
    ) -> Result<Self::Row, EngineError> {
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_of_requires_a_non_empty_qualifier() {
        let keys = KeyColumns::AnyOf(&["owner_id", "member_id"]);
        assert!(keys.check("t", &Quals::new()).is_err());
        assert!(keys.check("t", &Quals::new().with("owner_id", "")).is_err());
        assert!(keys.check("t", &Quals::new().with("member_id", "m")).is_ok());
        assert!(KeyColumns::Optional(&["x"]).check("t", &Quals::new()).is_ok());
    }

    #[test]
    fn point_lookup_needs_every_get_key() {
        let schema = TableSchema {
            name: "t",
            description: "",
            columns: vec![],
            list_keys: KeyColumns::Optional(&[]),
            get_keys: Some(&["id", "project_id"]),
        };
        assert!(!schema.is_point_lookup(&Quals::new().with("id", "1")));
        assert!(schema.is_point_lookup(&Quals::new().with("id", "1").with("project_id", "p")));
    }
}
