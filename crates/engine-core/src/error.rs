use crate::Operation;
use thiserror::Error;

/// Missing or invalid connection settings. Cloneable so a single failed
/// initialization can be reported to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid connection configuration ({field}): {message}")]
pub struct ConfigurationError {
    pub field: String,
    pub message: String,
}

impl ConfigurationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Remote call '{operation}' failed: {source}")]
    RemoteApi {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Table '{table}' requires at least one of the qualifiers: {}", columns.join(", "))]
    MissingKeyColumns { table: String, columns: Vec<String> },

    #[error("Failed to extract column '{column}': {reason}")]
    Extraction { column: String, reason: String },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Row sink error: {0}")]
    Sink(String),
}

impl EngineError {
    pub fn remote<E>(operation: &Operation, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::RemoteApi {
            operation: operation.to_string(),
            source: Box::new(source),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn remote_error_names_the_operation() {
        let op = Operation::new("azuredevops_build", "list_builds");
        let err = EngineError::remote(&op, Boom);
        assert_eq!(
            err.to_string(),
            "Remote call 'azuredevops_build.list_builds' failed: boom"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_keys_lists_every_candidate() {
        let err = EngineError::MissingKeyColumns {
            table: "azuredevops_account".into(),
            columns: vec!["owner_id".into(), "member_id".into()],
        };
        assert!(err.to_string().ends_with("owner_id, member_id"));
    }
}
