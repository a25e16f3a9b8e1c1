use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};

/// Equality constraints a consumer attaches to a query, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quals(BTreeMap<String, Value>);

impl Quals {
    pub fn new() -> Self {
        Quals::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Textual value of a qualifier; `None` when it is absent, null or empty.
    pub fn get_str(&self, column: &str) -> Option<String> {
        self.get(column)
            .and_then(Value::as_string)
            .filter(|s| !s.is_empty())
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Quals {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut quals = Quals::new();
        for (column, value) in iter {
            quals.insert(column, value);
        }
        quals
    }
}

/// A single `column=value` constraint as written on a command line.
#[derive(Debug, Clone, PartialEq)]
pub struct QualExpr {
    pub column: String,
    pub value: String,
}

impl FromStr for QualExpr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected 'column=value', got '{s}'"))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("Missing column name in '{s}'"));
        }
        Ok(QualExpr {
            column: column.to_string(),
            value: value.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_values_read_as_missing() {
        let quals = Quals::new()
            .with("id", "")
            .with("name", Value::Null)
            .with("project_id", "p1");

        assert!(quals.contains("id"));
        assert_eq!(quals.get_str("id"), None);
        assert_eq!(quals.get_str("name"), None);
        assert_eq!(quals.get_str("project_id").as_deref(), Some("p1"));
    }

    #[test]
    fn parses_cli_expressions() {
        let expr: QualExpr = "project_id = abc".parse().unwrap();
        assert_eq!(expr.column, "project_id");
        assert_eq!(expr.value, "abc");

        let expr: QualExpr = "path=\\a=b".parse().unwrap();
        assert_eq!(expr.value, "\\a=b");

        assert!("nope".parse::<QualExpr>().is_err());
        assert!("=x".parse::<QualExpr>().is_err());
    }
}
