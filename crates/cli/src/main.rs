use crate::{
    commands::{Commands, Selection},
    conn::ConnectionArgs,
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use connectors::plugin::{Plugin, http_connector};
use engine_core::catalog::ScanRequest;
use model::records::row::RowData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;
mod shutdown;

/// Rows buffered between the scan task and the printer.
const STREAM_BUFFER: usize = 256;

#[derive(Parser)]
#[command(name = "azdo", version, about = "Query Azure DevOps resources as tables")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so query output stays clean on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli, &shutdown).await {
        Ok(()) => ExitCode::Success,
        Err(CliError::ShutdownRequested) => ExitCode::ShutdownRequested,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("error: {err}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(cli: Cli, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    let plugin = Arc::new(build_plugin(&cli.connection)?);

    match cli.command {
        Commands::Tables => {
            for schema in plugin.catalog().schemas() {
                println!("{:<36} {}", schema.name, schema.description);
            }
        }
        Commands::Describe { table, json } => {
            output::print_schema(&plugin.schema(&table)?, json)?;
        }
        Commands::Query {
            table,
            selection,
            limit,
        } => {
            let request = scan_request(&plugin, &table, &selection, shutdown)?.with_limit(limit);
            query(&plugin, &table, request, selection.json).await?;
        }
        Commands::Get { table, selection } => {
            let request = scan_request(&plugin, &table, &selection, shutdown)?;
            let rows: Vec<RowData> = plugin.get(&table, &request).await?.into_iter().collect();
            print_rows(&rows, selection.json)?;
        }
        Commands::TestConn => {
            let organization = plugin.test_connection().await?;
            println!("Connection to organization '{organization}' succeeded");
        }
    }

    if shutdown.is_shutdown_requested() {
        return Err(CliError::ShutdownRequested);
    }
    Ok(())
}

fn build_plugin(args: &ConnectionArgs) -> Result<Plugin, CliError> {
    let mut env = EnvManager::from_process();
    if let Some(path) = &args.env_file {
        env.load_from_file(path)?;
    }
    let config = args.connection_config()?;
    Ok(Plugin::with_connector(config, Arc::new(env), http_connector()))
}

fn scan_request(
    plugin: &Plugin,
    table: &str,
    selection: &Selection,
    shutdown: &ShutdownCoordinator,
) -> Result<ScanRequest, CliError> {
    let schema = plugin.schema(table)?;
    let quals = selection.quals(&schema)?;
    Ok(ScanRequest::new(quals)
        .with_columns(selection.columns.iter().cloned())
        .with_cancel(shutdown.cancel_token()))
}

/// JSON output is printed as rows arrive; text output needs every row to
/// size its columns.
async fn query(
    plugin: &Arc<Plugin>,
    table: &str,
    request: ScanRequest,
    as_json: bool,
) -> Result<(), CliError> {
    if !as_json {
        let mut rows: Vec<RowData> = Vec::new();
        plugin.scan(table, &request, &mut rows).await?;
        return print_rows(&rows, false);
    }

    let (mut rx, handle) = plugin.stream(table, request, STREAM_BUFFER)?;
    while let Some(row) = rx.recv().await {
        println!("{}", output::json_line(&row)?);
    }
    let emitted = handle.await??;
    info!(table, rows = emitted, "query finished");
    Ok(())
}

fn print_rows(rows: &[RowData], as_json: bool) -> Result<(), CliError> {
    if as_json {
        for row in rows {
            println!("{}", output::json_line(row)?);
        }
    } else {
        print!("{}", output::render_table(rows));
    }
    Ok(())
}
