use crate::{
    client::{CursorStyle, DevOpsClient},
    error::ApiError,
    transport::ApiRequest,
};
use async_trait::async_trait;
use engine_core::{lookup::GetRequest, paginate::ListRequest};
use model::pagination::{cursor::Cursor, page::Page};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// A collection endpoint whose rows decode into `T`.
pub struct Collection<T> {
    request: ApiRequest,
    cursor_style: CursorStyle,
    page_param: Option<&'static str>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Collection<T> {
    pub fn new(request: ApiRequest) -> Self {
        Collection {
            request,
            cursor_style: CursorStyle::Token,
            page_param: None,
            _item: PhantomData,
        }
    }

    pub fn cursor(mut self, style: CursorStyle) -> Self {
        self.cursor_style = style;
        self
    }

    /// Sends the page size under `param` (usually `$top`).
    pub fn paged_by(mut self, param: &'static str) -> Self {
        self.page_param = Some(param);
        self
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> ListRequest for Collection<T> {
    type Client = DevOpsClient;
    type Item = T;
    type Error = ApiError;

    async fn fetch_page(
        &self,
        client: &DevOpsClient,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<Page<T>, ApiError> {
        match self.page_param {
            Some(param) => {
                let request = self.request.clone().param(param, page_size);
                client.list_page(&request, self.cursor_style, cursor).await
            }
            None => client.list_page(&self.request, self.cursor_style, cursor).await,
        }
    }
}

/// A single-entity endpoint whose body decodes into `T`.
pub struct Single<T> {
    request: ApiRequest,
    _item: PhantomData<fn() -> T>,
}

impl<T> Single<T> {
    pub fn new(request: ApiRequest) -> Self {
        Single {
            request,
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> GetRequest for Single<T> {
    type Client = DevOpsClient;
    type Item = T;
    type Error = ApiError;

    async fn fetch(&self, client: &DevOpsClient) -> Result<Option<T>, ApiError> {
        client.fetch_one(&self.request).await
    }
}
