use crate::{
    error::ApiError,
    transport::{ApiRequest, ApiResponse, Transport},
};
use engine_core::table::Connection;
use model::pagination::{cursor::Cursor, page::Page};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub mod requests;

pub use requests::{Collection, Single};

const CONTINUATION_PARAM: &str = "continuationToken";

/// How an endpoint continues past its first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// Opaque string token.
    Token,
    /// Integer token; zero or empty means done.
    Numeric,
    /// The endpoint always answers with a single page.
    None,
}

impl CursorStyle {
    fn apply(self, request: &mut ApiRequest, cursor: &Cursor) {
        if self == CursorStyle::None {
            return;
        }
        if let Some(token) = cursor.as_param() {
            request.set_param(CONTINUATION_PARAM, token);
        }
    }

    fn next(self, continuation: Option<&str>) -> Option<Cursor> {
        match self {
            CursorStyle::Token => Cursor::from_token(continuation),
            CursorStyle::Numeric => Cursor::from_numeric(continuation),
            CursorStyle::None => None,
        }
    }
}

/// Authenticated handle on one organization.
#[derive(Clone)]
pub struct DevOpsClient {
    transport: Arc<dyn Transport>,
    organization: String,
}

impl DevOpsClient {
    pub fn new(transport: Arc<dyn Transport>, organization: impl Into<String>) -> Self {
        DevOpsClient {
            transport,
            organization: organization.into(),
        }
    }

    pub fn organization_name(&self) -> &str {
        &self.organization
    }

    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.send(request).await
    }

    /// Fetches the page at `cursor` and decodes its rows.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        style: CursorStyle,
        cursor: &Cursor,
    ) -> Result<Page<T>, ApiError> {
        let mut request = request.clone();
        style.apply(&mut request, cursor);

        let response = self.transport.send(&request).await?;
        let rows = decode_collection(response.body)?;
        Ok(Page::new(rows, style.next(response.continuation.as_deref())))
    }

    /// Fetches a single entity; a 404 or an empty body means it does not exist.
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<Option<T>, ApiError> {
        match self.transport.send(request).await {
            Ok(response) if response.body.is_null() => Ok(None),
            Ok(response) => Ok(Some(serde_json::from_value(response.body)?)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl Connection for DevOpsClient {
    fn organization(&self) -> Option<&str> {
        Some(&self.organization)
    }
}

/// Rows of a `{"count": n, "value": [...]}` envelope, a bare array, or nothing.
fn decode_collection<T: DeserializeOwned>(body: serde_json::Value) -> Result<Vec<T>, ApiError> {
    let rows = match body {
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Object(mut envelope) if envelope.contains_key("value") => envelope
            .remove("value")
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        other => other,
    };
    Ok(serde_json::from_value(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_envelopes_and_bare_arrays() {
        let enveloped: Vec<i64> = decode_collection(json!({"count": 2, "value": [1, 2]})).unwrap();
        assert_eq!(enveloped, vec![1, 2]);

        let bare: Vec<i64> = decode_collection(json!([3])).unwrap();
        assert_eq!(bare, vec![3]);

        let empty: Vec<i64> = decode_collection(json!(null)).unwrap();
        assert!(empty.is_empty());

        assert!(decode_collection::<i64>(json!({"message": "nope"})).is_err());
    }

    #[test]
    fn cursor_styles_read_their_own_tokens() {
        assert_eq!(
            CursorStyle::Token.next(Some("abc")),
            Some(Cursor::Token("abc".into()))
        );
        assert_eq!(CursorStyle::Numeric.next(Some("42")), Some(Cursor::Numeric(42)));
        assert_eq!(CursorStyle::Numeric.next(Some("")), None);
        assert_eq!(CursorStyle::None.next(Some("abc")), None);

        let mut request = ApiRequest::new(crate::transport::ApiHost::Release, ["_apis"], "7.1");
        CursorStyle::Numeric.apply(&mut request, &Cursor::Numeric(42));
        assert_eq!(request.query_value("continuationToken"), Some("42"));
    }
}
