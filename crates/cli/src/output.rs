use crate::error::CliError;
use engine_core::table::{KeyColumns, TableSchema};
use model::{core::value::Value, records::row::RowData};
use serde_json::json;

/// Widest a text cell may get before it is cut.
const MAX_CELL_WIDTH: usize = 60;

pub fn schema_json(schema: &TableSchema) -> serde_json::Value {
    let (list_rule, list_keys) = match schema.list_keys {
        KeyColumns::Optional(columns) => ("optional", columns),
        KeyColumns::AnyOf(columns) => ("any_of", columns),
    };

    json!({
        "name": schema.name,
        "description": schema.description,
        "list_keys": { "require": list_rule, "columns": list_keys },
        "get_keys": schema.get_keys,
        "columns": schema.columns.iter().map(|c| json!({
            "name": c.name,
            "type": c.column_type,
            "description": c.description,
            "hydrate": c.hydrate,
        })).collect::<Vec<_>>(),
    })
}

pub fn print_schema(schema: &TableSchema, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&schema_json(schema))?);
        return Ok(());
    }

    println!("{}: {}", schema.name, schema.description);
    match schema.list_keys {
        KeyColumns::Optional(columns) if !columns.is_empty() => {
            println!("list qualifiers: {}", columns.join(", "));
        }
        KeyColumns::AnyOf(columns) => {
            println!("list requires one of: {}", columns.join(", "));
        }
        _ => {}
    }
    if let Some(keys) = schema.get_keys {
        println!("get keys: {}", keys.join(", "));
    }
    println!();

    let width = schema.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);
    for column in &schema.columns {
        let hydrate = column
            .hydrate
            .map(|step| format!(" [{step}]"))
            .unwrap_or_default();
        println!(
            "{:<width$}  {:<9}  {}{hydrate}",
            column.name,
            column.column_type.to_string(),
            column.description
        );
    }
    Ok(())
}

pub fn json_line(row: &RowData) -> Result<String, CliError> {
    Ok(serde_json::to_string(&row.to_json())?)
}

/// Renders rows as an aligned text table with a header line.
pub fn render_table(rows: &[RowData]) -> String {
    let Some(first) = rows.first() else {
        return "(0 rows)\n".to_string();
    };
    let headers: Vec<String> = first.columns().map(str::to_string).collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| headers.iter().map(|h| cell_text(row, h)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain([h.len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = String::new();
    for values in [&headers, &rule].into_iter().chain(&cells) {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out.push_str(&format!("({} rows)\n", rows.len()));
    out
}

fn cell_text(row: &RowData, column: &str) -> String {
    let text = match row.get_value(column) {
        Value::Null => String::new(),
        value => value.to_string(),
    };
    let text = text.replace(['\n', '\r'], " ");
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        text
    }
}
