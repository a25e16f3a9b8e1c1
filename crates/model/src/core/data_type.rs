use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Column types a table may declare.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Bool,
    Timestamp,
    Json,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "STRING",
            ColumnType::Int => "INT",
            ColumnType::Bool => "BOOL",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Json => "JSON",
        };
        f.write_str(name)
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(ColumnType::String),
            "int" | "integer" | "bigint" => Ok(ColumnType::Int),
            "bool" | "boolean" => Ok(ColumnType::Bool),
            "timestamp" => Ok(ColumnType::Timestamp),
            "json" | "jsonb" => Ok(ColumnType::Json),
            other => Err(format!("Unknown column type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("JSONB".parse::<ColumnType>(), Ok(ColumnType::Json));
        assert_eq!("Boolean".parse::<ColumnType>(), Ok(ColumnType::Bool));
        assert!("decimal".parse::<ColumnType>().is_err());
    }
}
