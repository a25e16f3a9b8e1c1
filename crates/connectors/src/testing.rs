//! An in-memory [`Transport`] for tests: canned replies routed by path and
//! continuation token, with every request recorded.

use crate::{
    client::DevOpsClient,
    error::ApiError,
    transport::{ApiRequest, ApiResponse, Transport},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Reply {
    Body(ApiResponse),
    Status(u16),
}

#[derive(Debug, Clone)]
struct Route {
    path: String,
    continuation: Option<String>,
    reply: Reply,
}

/// Unrouted requests answer 404.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Vec<Route>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// One page of a collection: served for `path` when the request carries
    /// `continuation`, and announcing `next` as the following page.
    pub fn page(
        mut self,
        path: &str,
        continuation: Option<&str>,
        rows: Vec<Value>,
        next: Option<&str>,
    ) -> Self {
        let body = serde_json::json!({ "count": rows.len(), "value": rows });
        let mut response = ApiResponse::new(body);
        if let Some(next) = next {
            response = response.with_continuation(next);
        }
        self.route(path, continuation, Reply::Body(response));
        self
    }

    /// A single-entity body served for `path`.
    pub fn entity(mut self, path: &str, body: Value) -> Self {
        self.route(path, None, Reply::Body(ApiResponse::new(body)));
        self
    }

    /// A failure status served for `path` at `continuation`.
    pub fn fail(mut self, path: &str, continuation: Option<&str>, status: u16) -> Self {
        self.route(path, continuation, Reply::Status(status));
        self
    }

    pub fn into_client(self, organization: &str) -> (DevOpsClient, Arc<MemoryTransport>) {
        let transport = Arc::new(self);
        let client = DevOpsClient::new(transport.clone(), organization);
        (client, transport)
    }

    fn route(&mut self, path: &str, continuation: Option<&str>, reply: Reply) {
        self.routes.push(Route {
            path: path.to_string(),
            continuation: continuation.map(str::to_string),
            reply,
        });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// Requests sent to exactly `path`.
    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path_string() == path)
            .collect()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let path = request.path_string();
        let continuation = request.query_value("continuationToken");
        let route = self
            .routes
            .iter()
            .find(|r| r.path == path && r.continuation.as_deref() == continuation);

        match route.map(|r| &r.reply) {
            Some(Reply::Body(response)) => Ok(response.clone()),
            Some(Reply::Status(status)) => Err(ApiError::Status {
                status: *status,
                url: path,
                body: String::new(),
            }),
            None => Err(ApiError::NotFound { url: path }),
        }
    }
}
