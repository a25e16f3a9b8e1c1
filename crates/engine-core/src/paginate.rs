use crate::{
    Operation,
    emitter::{Flow, RowEmitter},
    error::EngineError,
};
use async_trait::async_trait;
use model::pagination::{cursor::Cursor, page::Page};
use std::marker::PhantomData;
use tracing::{debug, error, warn};

/// One remote collection endpoint, fetched a page at a time.
#[async_trait]
pub trait ListRequest: Send + Sync {
    type Client: Sync;
    type Item: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_page(
        &self,
        client: &Self::Client,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<Page<Self::Item>, Self::Error>;
}

pub trait ListRequestExt: ListRequest + Sized {
    /// Wraps every fetched row, e.g. to attach the id of the parent it was listed under.
    fn map_rows<U, F>(self, map: F) -> MapRows<Self, F, U>
    where
        F: Fn(Self::Item) -> U + Send + Sync,
        U: Send,
    {
        MapRows {
            inner: self,
            map,
            _out: PhantomData,
        }
    }
}

impl<R: ListRequest> ListRequestExt for R {}

pub struct MapRows<R, F, U> {
    inner: R,
    map: F,
    _out: PhantomData<fn() -> U>,
}

#[async_trait]
impl<R, F, U> ListRequest for MapRows<R, F, U>
where
    R: ListRequest,
    F: Fn(R::Item) -> U + Send + Sync,
    U: Send,
{
    type Client = R::Client;
    type Item = U;
    type Error = R::Error;

    async fn fetch_page(
        &self,
        client: &R::Client,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<Page<U>, R::Error> {
        let page = self.inner.fetch_page(client, cursor, page_size).await?;
        Ok(page.map(&self.map))
    }
}

/// Fetches one page, logging and wrapping a failure with the operation id.
pub async fn fetch_page<R: ListRequest>(
    client: &R::Client,
    operation: &Operation,
    request: &R,
    cursor: &Cursor,
    page_size: usize,
) -> Result<Page<R::Item>, EngineError> {
    request
        .fetch_page(client, cursor, page_size)
        .await
        .map_err(|err| {
            error!(
                table = operation.table,
                operation = %operation,
                error = %err,
                "api_error"
            );
            EngineError::remote(operation, err)
        })
}

/// Walks a collection from the first page, emitting every row until the
/// service reports no continuation or the emitter asks to stop.
///
/// Rows emitted before a failing page stay delivered; the failure is
/// returned as [`EngineError::RemoteApi`].
pub async fn paginate<R: ListRequest>(
    client: &R::Client,
    operation: &Operation,
    request: &R,
    emitter: &mut RowEmitter<'_, R::Item>,
) -> Result<Flow, EngineError> {
    let mut cursor = Cursor::Start;
    let mut pages = 0usize;

    loop {
        if emitter.should_stop() {
            return Ok(Flow::Stop);
        }

        let page = fetch_page(client, operation, request, &cursor, emitter.page_size()).await?;
        pages += 1;
        debug!(
            operation = %operation,
            page = pages,
            rows = page.rows.len(),
            "fetched page"
        );

        for row in page.rows {
            if emitter.emit(row).await?.is_stop() {
                return Ok(Flow::Stop);
            }
        }

        match page.next {
            Some(next) if next == cursor => {
                warn!(operation = %operation, "service repeated its continuation; ending walk");
                return Ok(Flow::Continue);
            }
            Some(next) => cursor = next,
            None => return Ok(Flow::Continue),
        }
    }
}
