//! The connector as a host sees it: the table catalog plus one lazily
//! established connection per configuration.

use crate::{
    client::DevOpsClient,
    config::{ConnectionConfig, EnvSource, ProcessEnv, ResolvedConfig},
    error::ApiError,
    tables::{
        AccountTable, BuildDefinitionTable, BuildTable, DashboardTable, GitRepositoryBranchTable,
        GitRepositoryTable, GroupTable, PipelineTable, ProjectTable, ReleaseTable,
        ServiceEndpointTable, TeamMemberTable, TeamTable, UserTable, project,
    },
    transport::{HttpTransport, Transport},
};
use engine_core::{
    cache::ConnectionCache,
    catalog::{Catalog, DynTable, ScanRequest},
    emitter::RowSink,
    error::{ConfigurationError, EngineError},
    table::TableSchema,
};
use model::{core::qualifier::Quals, records::row::RowData};
use std::sync::Arc;
use tokio::{
    sync::{RwLock, mpsc},
    task::JoinHandle,
};
use tracing::{debug, error, info};

const CLIENT_KEY: &str = "client";
const ORGANIZATION_KEY: &str = "organization";

/// Builds the transport for a resolved configuration.
pub type Connector =
    Arc<dyn Fn(&ResolvedConfig) -> Result<Arc<dyn Transport>, ApiError> + Send + Sync>;

/// The HTTPS connector used outside of tests.
pub fn http_connector() -> Connector {
    Arc::new(|config| Ok(Arc::new(HttpTransport::new(config)?) as Arc<dyn Transport>))
}

/// Every table of the connector.
pub fn catalog() -> Catalog<DevOpsClient> {
    let mut catalog = Catalog::new();
    catalog
        .register(AccountTable)
        .register(BuildTable)
        .register(BuildDefinitionTable)
        .register(DashboardTable)
        .register(GitRepositoryTable)
        .register(GitRepositoryBranchTable)
        .register(GroupTable)
        .register(PipelineTable)
        .register(ProjectTable)
        .register(ReleaseTable)
        .register(ServiceEndpointTable)
        .register(TeamTable)
        .register(TeamMemberTable)
        .register(UserTable);
    catalog
}

/// The current settings and a counter bumped on every replacement.
struct Settings {
    config: ConnectionConfig,
    generation: u64,
}

/// A cached value tagged with the settings generation it was built from.
type Tagged<V> = (u64, V);

pub struct Plugin {
    catalog: Catalog<DevOpsClient>,
    settings: RwLock<Settings>,
    env: Arc<dyn EnvSource>,
    connector: Connector,
    clients: ConnectionCache<Tagged<DevOpsClient>>,
    organizations: ConnectionCache<Tagged<String>>,
}

impl Plugin {
    /// A plugin reading environment defaults from the process and talking HTTPS.
    pub fn new(config: ConnectionConfig) -> Self {
        Plugin::with_connector(config, Arc::new(ProcessEnv), http_connector())
    }

    pub fn with_connector(
        config: ConnectionConfig,
        env: Arc<dyn EnvSource>,
        connector: Connector,
    ) -> Self {
        Plugin {
            catalog: catalog(),
            settings: RwLock::new(Settings {
                config,
                generation: 0,
            }),
            env,
            connector,
            clients: ConnectionCache::new("azdo-clients"),
            organizations: ConnectionCache::new("azdo-organizations"),
        }
    }

    pub fn catalog(&self) -> &Catalog<DevOpsClient> {
        &self.catalog
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.catalog.names().collect()
    }

    pub fn schema(&self, table: &str) -> Result<TableSchema, EngineError> {
        Ok(self.catalog.table(table)?.schema().clone())
    }

    pub async fn config(&self) -> ConnectionConfig {
        self.settings.read().await.config.clone()
    }

    async fn generation(&self) -> u64 {
        self.settings.read().await.generation
    }

    /// Replaces the connection settings. The cached client and organization
    /// name are dropped and rebuilt on next use. Values still being built
    /// from the old settings are discarded when they land.
    pub async fn update_config(&self, config: ConnectionConfig) {
        let mut settings = self.settings.write().await;
        settings.config = config;
        settings.generation += 1;
        self.clients.invalidate_all();
        self.organizations.invalidate_all();
        info!(generation = settings.generation, "connection configuration updated");
    }

    async fn resolve(&self) -> Result<Tagged<ResolvedConfig>, ConfigurationError> {
        let (config, generation) = {
            let settings = self.settings.read().await;
            (settings.config.clone(), settings.generation)
        };
        let resolved = config.resolve(self.env.as_ref()).inspect_err(|err| {
            error!(field = %err.field, error = %err, "connection configuration rejected");
        })?;
        Ok((generation, resolved))
    }

    /// Organization named by the configured URL, computed once per configuration.
    pub async fn organization(&self) -> Result<String, EngineError> {
        loop {
            let (generation, organization) = self
                .organizations
                .get_or_try_insert(ORGANIZATION_KEY, async {
                    self.resolve()
                        .await
                        .map(|(generation, resolved)| (generation, resolved.organization))
                })
                .await?;
            if generation == self.generation().await {
                return Ok(organization);
            }
            debug!(generation, "discarding organization of replaced settings");
            self.organizations.invalidate(ORGANIZATION_KEY).await;
        }
    }

    /// The connection handle, established on first use.
    pub async fn client(&self) -> Result<DevOpsClient, EngineError> {
        loop {
            let (generation, client) = self
                .clients
                .get_or_try_insert(CLIENT_KEY, self.connect())
                .await?;
            if generation == self.generation().await {
                return Ok(client);
            }
            debug!(generation, "discarding client of replaced settings");
            self.clients.invalidate(CLIENT_KEY).await;
        }
    }

    async fn connect(&self) -> Result<Tagged<DevOpsClient>, ConfigurationError> {
        let (generation, resolved) = self.resolve().await?;
        let organization = resolved.organization.clone();

        let transport = (self.connector)(&resolved).map_err(|err| {
            error!(error = %err, "failed to set up the transport");
            ConfigurationError::new("organization_url", err.to_string())
        })?;

        info!(organization = %organization, "connection established");
        Ok((generation, DevOpsClient::new(transport, organization)))
    }

    /// Streams rows of `table` into `sink`; returns how many were delivered.
    pub async fn scan(
        &self,
        table: &str,
        request: &ScanRequest,
        sink: &mut dyn RowSink<RowData>,
    ) -> Result<u64, EngineError> {
        let table = self.catalog.table(table)?;
        let client = self.client().await?;
        table.scan(&client, request, sink).await.inspect_err(|err| {
            error!(table = table.schema().name, error = %err, "scan failed");
        })
    }

    /// Point lookup by the table's get keys.
    pub async fn get(
        &self,
        table: &str,
        request: &ScanRequest,
    ) -> Result<Option<RowData>, EngineError> {
        let table = self.catalog.table(table)?;
        let client = self.client().await?;
        table.get(&client, request).await
    }

    /// Runs a scan on its own task, handing rows over a bounded channel.
    /// Dropping the receiver ends the scan early.
    pub fn stream(
        self: &Arc<Self>,
        table: &str,
        request: ScanRequest,
        buffer: usize,
    ) -> Result<(mpsc::Receiver<RowData>, JoinHandle<Result<u64, EngineError>>), EngineError>
    {
        let table: Arc<dyn DynTable<DevOpsClient>> = self.catalog.table(table)?;
        let plugin = Arc::clone(self);
        let (mut tx, rx) = mpsc::channel::<RowData>(buffer.max(1));

        let handle = tokio::spawn(async move {
            let client = plugin.client().await?;
            table.scan(&client, &request, &mut tx).await.inspect_err(|err| {
                error!(table = table.schema().name, error = %err, "streamed scan failed");
            })
        });

        Ok((rx, handle))
    }

    /// Checks the settings resolve and the organization answers a one-row
    /// project listing. Returns the organization name.
    pub async fn test_connection(&self) -> Result<String, EngineError> {
        let organization = self.organization().await?;
        let mut rows: Vec<RowData> = Vec::with_capacity(1);
        let request = ScanRequest::new(Quals::new()).with_limit(Some(1));
        self.scan(project::TABLE, &request, &mut rows).await?;
        info!(organization = %organization, "connection test passed");
        Ok(organization)
    }
}
