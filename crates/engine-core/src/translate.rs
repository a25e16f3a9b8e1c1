use crate::Operation;
use model::core::{qualifier::Quals, value::Value};
use tracing::warn;
use uuid::Uuid;

/// How a qualifier value is turned into a request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Passed through as text.
    Text,
    /// Must parse as an integer.
    Integer,
    /// Must parse as a UUID; sent in hyphenated form.
    Uuid,
    /// Must match one of the listed values, ignoring case; sent in the listed spelling.
    Enum(&'static [&'static str]),
    /// Boolean sent as one of two literals.
    Flag {
        on: &'static str,
        off: &'static str,
    },
}

impl Conversion {
    fn convert(&self, value: &Value) -> Option<String> {
        match self {
            Conversion::Text => value.as_string(),
            Conversion::Integer => value.as_i64().map(|n| n.to_string()),
            Conversion::Uuid => value
                .as_string()
                .and_then(|s| Uuid::parse_str(s.trim()).ok())
                .map(|id| id.hyphenated().to_string()),
            Conversion::Enum(allowed) => {
                let raw = value.as_string()?;
                allowed
                    .iter()
                    .find(|candidate| candidate.eq_ignore_ascii_case(raw.trim()))
                    .map(|candidate| candidate.to_string())
            }
            Conversion::Flag { on, off } => {
                value
                    .as_bool()
                    .map(|flag| if flag { on.to_string() } else { off.to_string() })
            }
        }
    }
}

/// Maps one optional list qualifier onto one remote filter parameter.
#[derive(Debug, Clone, Copy)]
pub struct FilterMapping {
    pub column: &'static str,
    pub param: &'static str,
    pub conversion: Conversion,
}

impl FilterMapping {
    pub const fn new(column: &'static str, param: &'static str, conversion: Conversion) -> Self {
        FilterMapping {
            column,
            param,
            conversion,
        }
    }

    pub const fn text(column: &'static str, param: &'static str) -> Self {
        FilterMapping::new(column, param, Conversion::Text)
    }
}

/// Builds remote filter parameters from the qualifiers that have a mapping.
///
/// Absent or empty qualifiers leave their parameter unset. A value that
/// fails its conversion is dropped with a warning and the list proceeds
/// unfiltered on that column.
pub fn translate(
    operation: &Operation,
    quals: &Quals,
    mappings: &[FilterMapping],
) -> Vec<(String, String)> {
    let mut params = Vec::new();

    for mapping in mappings {
        let Some(value) = quals.get(mapping.column) else {
            continue;
        };
        if value.is_null() || value.as_string().is_some_and(|s| s.is_empty()) {
            continue;
        }

        match mapping.conversion.convert(value) {
            Some(param) => params.push((mapping.param.to_string(), param)),
            None => warn!(
                operation = %operation,
                column = mapping.column,
                value = %value,
                "qualifier value rejected; filter ignored"
            ),
        }
    }

    params
}
