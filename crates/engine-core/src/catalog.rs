use crate::{
    emitter::{RowEmitter, RowSink},
    error::EngineError,
    projection::{ProjectingSink, hydrate_steps, select_columns},
    table::{Column, ColumnSchema, Connection, ExtractContext, TableProvider, TableSchema},
};
use async_trait::async_trait;
use model::{core::qualifier::Quals, records::row::RowData};
use std::{collections::BTreeMap, marker::PhantomData, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What a consumer asks of one table.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub quals: Quals,
    pub limit: Option<u64>,
    /// Columns to project; empty means all of them.
    pub columns: Vec<String>,
    pub cancel: CancellationToken,
}

impl ScanRequest {
    pub fn new(quals: Quals) -> Self {
        ScanRequest {
            quals,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Object-safe view of a table, as the host sees it.
#[async_trait]
pub trait DynTable<C: Connection>: Send + Sync {
    fn schema(&self) -> &TableSchema;

    /// Streams matching rows into `sink` and returns how many were delivered.
    /// Runs a point lookup instead of a list when every get key is qualified.
    async fn scan(
        &self,
        client: &C,
        request: &ScanRequest,
        sink: &mut dyn RowSink<RowData>,
    ) -> Result<u64, EngineError>;

    /// Point lookup by the table's get keys.
    async fn get(&self, client: &C, request: &ScanRequest) -> Result<Option<RowData>, EngineError>;
}

/// Erases a [`TableProvider`]'s row type behind [`DynTable`].
pub struct TableAdapter<C: Connection, P: TableProvider<C>> {
    provider: P,
    columns: Vec<Column<P::Row>>,
    schema: TableSchema,
    _client: PhantomData<fn(&C)>,
}

impl<C: Connection, P: TableProvider<C>> TableAdapter<C, P> {
    pub fn new(provider: P) -> Self {
        let columns = provider.columns();
        let schema = TableSchema {
            name: provider.name(),
            description: provider.description(),
            columns: columns
                .iter()
                .map(|c| c.schema.clone())
                .collect::<Vec<ColumnSchema>>(),
            list_keys: provider.list_keys(),
            get_keys: provider.get_keys(),
        };

        TableAdapter {
            provider,
            columns,
            schema,
            _client: PhantomData,
        }
    }

    async fn run(
        &self,
        client: &C,
        request: &ScanRequest,
        point: bool,
        sink: &mut dyn RowSink<RowData>,
    ) -> Result<u64, EngineError> {
        let table = self.schema.name;
        let selected = select_columns(table, &self.columns, &request.columns)?;
        let steps = hydrate_steps(&self.columns, &selected);
        if !point {
            self.schema.list_keys.check(table, &request.quals)?;
        }

        let mut projecting = ProjectingSink {
            provider: &self.provider,
            client,
            table,
            columns: &self.columns,
            selected: &selected,
            steps: &steps,
            ctx: ExtractContext {
                organization: client.organization(),
                quals: &request.quals,
            },
            downstream: sink,
        };
        let mut emitter =
            RowEmitter::<P::Row>::new(&mut projecting, request.limit, request.cancel.clone());

        if point {
            debug!(table, "point lookup");
            if !emitter.should_stop()
                && let Some(row) = self.provider.get(client, &request.quals).await?
            {
                emitter.emit(row).await?;
            }
        } else {
            debug!(table, quals = request.quals.len(), limit = ?request.limit, "list");
            self.provider.list(client, &request.quals, &mut emitter).await?;
        }

        Ok(emitter.emitted())
    }
}

#[async_trait]
impl<C: Connection, P: TableProvider<C>> DynTable<C> for TableAdapter<C, P> {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    async fn scan(
        &self,
        client: &C,
        request: &ScanRequest,
        sink: &mut dyn RowSink<RowData>,
    ) -> Result<u64, EngineError> {
        let point = self.schema.is_point_lookup(&request.quals);
        let emitted = self.run(client, request, point, sink).await?;
        info!(table = self.schema.name, rows = emitted, "scan finished");
        Ok(emitted)
    }

    async fn get(&self, client: &C, request: &ScanRequest) -> Result<Option<RowData>, EngineError> {
        if self.schema.get_keys.is_none() {
            debug!(table = self.schema.name, "table has no point lookup");
            return Ok(None);
        }

        let mut rows: Vec<RowData> = Vec::with_capacity(1);
        let request = request.clone().with_limit(Some(1));
        self.run(client, &request, true, &mut rows).await?;
        Ok(rows.pop())
    }
}

/// Every table a plugin exposes, by name.
pub struct Catalog<C: Connection> {
    tables: BTreeMap<&'static str, Arc<dyn DynTable<C>>>,
}

impl<C: Connection> Default for Catalog<C> {
    fn default() -> Self {
        Catalog {
            tables: BTreeMap::new(),
        }
    }
}

impl<C: Connection> Catalog<C> {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn register<P: TableProvider<C>>(&mut self, provider: P) -> &mut Self {
        let adapter = TableAdapter::new(provider);
        self.tables.insert(adapter.schema.name, Arc::new(adapter));
        self
    }

    pub fn table(&self, name: &str) -> Result<Arc<dyn DynTable<C>>, EngineError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownTable(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.keys().copied()
    }

    pub fn schemas(&self) -> impl Iterator<Item = &TableSchema> + '_ {
        self.tables.values().map(|t| t.schema())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
