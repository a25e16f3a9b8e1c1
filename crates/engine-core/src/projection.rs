use crate::{
    emitter::RowSink,
    error::EngineError,
    table::{Column, Connection, ExtractContext, TableProvider},
};
use async_trait::async_trait;
use model::{core::value::FieldValue, records::row::RowData};

/// Indexes of the requested columns in declaration order of the request.
/// An empty request selects every column.
pub fn select_columns<R>(
    table: &str,
    columns: &[Column<R>],
    requested: &[String],
) -> Result<Vec<usize>, EngineError> {
    if requested.is_empty() {
        return Ok((0..columns.len()).collect());
    }

    requested
        .iter()
        .map(|name| {
            columns
                .iter()
                .position(|c| c.schema.name.eq_ignore_ascii_case(name.trim()))
                .ok_or_else(|| EngineError::UnknownColumn {
                    table: table.to_string(),
                    column: name.clone(),
                })
        })
        .collect()
}

/// Distinct hydrate steps the selected columns depend on, first use first.
pub fn hydrate_steps<R>(columns: &[Column<R>], selected: &[usize]) -> Vec<&'static str> {
    let mut steps = Vec::new();
    for step in selected.iter().filter_map(|&i| columns[i].schema.hydrate) {
        if !steps.contains(&step) {
            steps.push(step);
        }
    }
    steps
}

pub fn project<R>(
    table: &str,
    columns: &[Column<R>],
    selected: &[usize],
    row: &R,
    ctx: &ExtractContext<'_>,
) -> Result<RowData, EngineError> {
    let field_values = selected
        .iter()
        .map(|&i| {
            let column = &columns[i];
            (column.extract)(row, ctx)
                .map(|value| FieldValue::new(column.schema.name, value))
                .map_err(|err| EngineError::Extraction {
                    column: column.schema.name.to_string(),
                    reason: err.0,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RowData::new(table, field_values))
}

/// Hydrates and projects typed rows on their way to the consumer's sink.
pub(crate) struct ProjectingSink<'s, C: Connection, P: TableProvider<C>> {
    pub provider: &'s P,
    pub client: &'s C,
    pub table: &'static str,
    pub columns: &'s [Column<P::Row>],
    pub selected: &'s [usize],
    pub steps: &'s [&'static str],
    pub ctx: ExtractContext<'s>,
    pub downstream: &'s mut dyn RowSink<RowData>,
}

#[async_trait]
impl<C: Connection, P: TableProvider<C>> RowSink<P::Row> for ProjectingSink<'_, C, P> {
    async fn accept(&mut self, row: P::Row) -> Result<bool, EngineError> {
        let row = if self.steps.is_empty() {
            row
        } else {
            self.provider.hydrate(self.client, row, self.steps).await?
        };
        let projected = project(self.table, self.columns, self.selected, &row, &self.ctx)?;
        self.downstream.accept(projected).await
    }
}
