use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Accepts RFC 3339 timestamps as well as the offset-less form some
/// endpoints emit (read as UTC). Unparsable text becomes `None`.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Strings, numbers and booleans all read as text.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "lenient_string")]
        size: Option<String>,
    }

    #[test]
    fn reads_both_timestamp_forms() {
        let zoned: Probe = serde_json::from_value(json!({"at": "2023-05-13T17:11:50.4433333Z"})).unwrap();
        assert_eq!(zoned.at.unwrap().second(), 50);

        let naive: Probe = serde_json::from_value(json!({"at": "2021-01-02T03:04:05"})).unwrap();
        assert_eq!(naive.at.unwrap().day(), 2);

        let garbage: Probe = serde_json::from_value(json!({"at": "yesterday"})).unwrap();
        assert!(garbage.at.is_none());

        let missing: Probe = serde_json::from_value(json!({})).unwrap();
        assert!(missing.at.is_none() && missing.size.is_none());
    }

    #[test]
    fn numbers_read_as_text() {
        let probe: Probe = serde_json::from_value(json!({"size": 1024})).unwrap();
        assert_eq!(probe.size.as_deref(), Some("1024"));
    }
}
