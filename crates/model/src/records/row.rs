use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// A projected output row: the requested columns of one table row, in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub table: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(table: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            table: table.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.field_values.iter().map(|f| f.name.as_str())
    }

    /// Row as a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let object = self
            .field_values
            .iter()
            .map(|f| (f.name.clone(), f.value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(object)
    }
}
