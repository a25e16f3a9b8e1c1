use crate::error::ApiError;
use async_trait::async_trait;

pub mod http;
pub mod request;

pub use http::HttpTransport;
pub use request::{ApiHost, ApiRequest, ApiResponse};

/// Sends one GET to the service and returns its decoded body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}
