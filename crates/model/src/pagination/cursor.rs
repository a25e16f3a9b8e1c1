use serde::{Deserialize, Serialize};

/// Position in a remote collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// First page; no continuation is sent.
    Start,

    /// Opaque continuation token echoed back to the service.
    Token(String),

    /// Integer continuation used by the release service.
    Numeric(i64),
}

impl Cursor {
    /// Next cursor from a raw opaque token. An absent or empty token ends the walk.
    pub fn from_token(raw: Option<&str>) -> Option<Cursor> {
        match raw.map(str::trim) {
            Some(token) if !token.is_empty() => Some(Cursor::Token(token.to_string())),
            _ => None,
        }
    }

    /// Next cursor from a raw integer token. Absent, empty, zero or
    /// unparsable tokens end the walk.
    pub fn from_numeric(raw: Option<&str>) -> Option<Cursor> {
        raw.and_then(|token| token.trim().parse::<i64>().ok())
            .filter(|n| *n != 0)
            .map(Cursor::Numeric)
    }

    /// Value sent back to the service, if any.
    pub fn as_param(&self) -> Option<String> {
        match self {
            Cursor::Start => None,
            Cursor::Token(token) => Some(token.clone()),
            Cursor::Numeric(n) => Some(n.to_string()),
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Cursor::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_terminates() {
        assert_eq!(Cursor::from_token(None), None);
        assert_eq!(Cursor::from_token(Some("")), None);
        assert_eq!(
            Cursor::from_token(Some("abc")),
            Some(Cursor::Token("abc".into()))
        );
    }

    #[test]
    fn numeric_token_terminates_on_zero_or_garbage() {
        assert_eq!(Cursor::from_numeric(Some("0")), None);
        assert_eq!(Cursor::from_numeric(Some("x1")), None);
        assert_eq!(Cursor::from_numeric(Some("17")), Some(Cursor::Numeric(17)));
        assert_eq!(Cursor::Numeric(17).as_param().as_deref(), Some("17"));
        assert_eq!(Cursor::Start.as_param(), None);
    }
}
