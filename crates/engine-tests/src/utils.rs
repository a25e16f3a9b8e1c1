use connectors::{
    config::ConnectionConfig,
    plugin::{Connector, Plugin},
    testing::MemoryTransport,
    transport::Transport,
};
use engine_core::{catalog::ScanRequest, error::EngineError};
use model::{core::value::Value, records::row::RowData};
use serde_json::{Value as Json, json};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const ORG_URL: &str = "https://dev.azure.com/contoso";

pub fn settings(url: &str) -> ConnectionConfig {
    ConnectionConfig {
        organization_url: Some(url.to_string()),
        personal_access_token: Some("test-pat".to_string()),
        request_timeout_secs: None,
    }
}

/// Hands out the same in-memory transport and counts how often it was asked.
pub fn memory_connector(transport: Arc<MemoryTransport>, connects: Arc<AtomicUsize>) -> Connector {
    Arc::new(move |_| {
        connects.fetch_add(1, Ordering::SeqCst);
        Ok(transport.clone() as Arc<dyn Transport>)
    })
}

/// A plugin for the `contoso` organization backed by `transport`.
pub fn plugin(transport: MemoryTransport) -> (Arc<Plugin>, Arc<MemoryTransport>) {
    let transport = Arc::new(transport);
    let plugin = Plugin::with_connector(
        settings(ORG_URL),
        Arc::new(HashMap::<String, String>::new()),
        memory_connector(transport.clone(), Arc::default()),
    );
    (Arc::new(plugin), transport)
}

/// Runs a scan and returns whatever reached the sink, plus the outcome.
pub async fn scan(
    plugin: &Plugin,
    table: &str,
    request: ScanRequest,
) -> (Vec<RowData>, Result<u64, EngineError>) {
    let mut rows: Vec<RowData> = Vec::new();
    let outcome = plugin.scan(table, &request, &mut rows).await;
    (rows, outcome)
}

pub fn column(rows: &[RowData], name: &str) -> Vec<Value> {
    rows.iter().map(|row| row.get_value(name)).collect()
}

pub fn projects(ids: &[&str]) -> Vec<Json> {
    ids.iter()
        .map(|id| json!({"id": id, "name": format!("project-{id}"), "state": "wellFormed"}))
        .collect()
}

pub fn builds(project: &str, ids: std::ops::RangeInclusive<i64>) -> Vec<Json> {
    ids.map(|id| {
        json!({
            "id": id,
            "buildNumber": format!("{project}.{id}"),
            "status": "completed",
            "project": {"id": project},
        })
    })
    .collect()
}
