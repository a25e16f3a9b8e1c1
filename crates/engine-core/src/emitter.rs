use crate::error::EngineError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Largest page size ever requested from a remote collection.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Consumer side of a scan.
#[async_trait]
pub trait RowSink<T: Send>: Send {
    /// Delivers one row. Returns `false` once the consumer wants no more rows.
    async fn accept(&mut self, row: T) -> Result<bool, EngineError>;
}

#[async_trait]
impl<T: Send> RowSink<T> for Vec<T> {
    async fn accept(&mut self, row: T) -> Result<bool, EngineError> {
        self.push(row);
        Ok(true)
    }
}

#[async_trait]
impl<T: Send> RowSink<T> for mpsc::Sender<T> {
    async fn accept(&mut self, row: T) -> Result<bool, EngineError> {
        // A dropped receiver is an early stop, not a failure.
        Ok(self.send(row).await.is_ok())
    }
}

/// Whether a producer should keep going after handing over rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl Flow {
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

/// Pushes rows into a sink while enforcing the row budget and cancellation.
///
/// The budget is shared by everything emitted through one emitter, so a
/// chained scan stops across parents as soon as the consumer is satisfied.
pub struct RowEmitter<'a, T> {
    sink: &'a mut (dyn RowSink<T> + 'a),
    remaining: Option<u64>,
    cancel: CancellationToken,
    emitted: u64,
    closed: bool,
}

impl<'a, T: Send> RowEmitter<'a, T> {
    pub fn new(
        sink: &'a mut (dyn RowSink<T> + 'a),
        limit: Option<u64>,
        cancel: CancellationToken,
    ) -> Self {
        RowEmitter {
            sink,
            remaining: limit,
            cancel,
            emitted: 0,
            closed: false,
        }
    }

    /// Page size to request next: the remaining budget capped at [`MAX_PAGE_SIZE`].
    pub fn page_size(&self) -> usize {
        match self.remaining {
            Some(remaining) => usize::try_from(remaining)
                .unwrap_or(MAX_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            None => MAX_PAGE_SIZE,
        }
    }

    pub fn should_stop(&self) -> bool {
        self.closed || self.remaining == Some(0) || self.cancel.is_cancelled()
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub async fn emit(&mut self, row: T) -> Result<Flow, EngineError> {
        if self.should_stop() {
            return Ok(Flow::Stop);
        }

        if self.sink.accept(row).await? {
            self.emitted += 1;
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
        } else {
            self.closed = true;
        }

        Ok(if self.should_stop() {
            Flow::Stop
        } else {
            Flow::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stops_when_budget_is_spent() {
        let mut rows: Vec<u32> = Vec::new();
        let mut emitter = RowEmitter::<u32>::new(&mut rows, Some(2), CancellationToken::new());

        assert_eq!(emitter.emit(1).await.unwrap(), Flow::Continue);
        assert_eq!(emitter.emit(2).await.unwrap(), Flow::Stop);
        assert_eq!(emitter.emit(3).await.unwrap(), Flow::Stop);
        assert_eq!(emitter.emitted(), 2);
        drop(emitter);
        assert_eq!(rows, vec![1, 2]);
    }

    #[tokio::test]
    async fn page_size_follows_remaining_budget() {
        let mut rows: Vec<u32> = Vec::new();
        let mut emitter = RowEmitter::<u32>::new(&mut rows, Some(3), CancellationToken::new());
        assert_eq!(emitter.page_size(), 3);
        emitter.emit(1).await.unwrap();
        assert_eq!(emitter.page_size(), 2);

        let mut unbounded: Vec<u32> = Vec::new();
        let emitter = RowEmitter::<u32>::new(&mut unbounded, None, CancellationToken::new());
        assert_eq!(emitter.page_size(), MAX_PAGE_SIZE);

        let mut huge: Vec<u32> = Vec::new();
        let emitter = RowEmitter::<u32>::new(&mut huge, Some(50_000), CancellationToken::new());
        assert_eq!(emitter.page_size(), MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn cancellation_stops_emission() {
        let cancel = CancellationToken::new();
        let mut rows: Vec<u32> = Vec::new();
        let mut emitter = RowEmitter::<u32>::new(&mut rows, None, cancel.clone());

        assert_eq!(emitter.emit(1).await.unwrap(), Flow::Continue);
        cancel.cancel();
        assert!(emitter.should_stop());
        assert_eq!(emitter.emit(2).await.unwrap(), Flow::Stop);
        drop(emitter);
        assert_eq!(rows, vec![1]);
    }

    #[tokio::test]
    async fn closed_channel_stops_emission() {
        let (mut tx, rx) = mpsc::channel::<u32>(4);
        drop(rx);
        let mut emitter = RowEmitter::<u32>::new(&mut tx, None, CancellationToken::new());

        assert_eq!(emitter.emit(1).await.unwrap(), Flow::Stop);
        assert!(emitter.should_stop());
    }
}
