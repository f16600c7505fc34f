use crate::application::ports::sync_notifier::SyncNotifier;
use crate::application::services::{MirrorService, MutationQueueService, SyncOrchestrator};
use crate::infrastructure::connectivity::{ConnectivityMonitor, HealthProbe, SubscriptionId};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::gateway::HttpMutationGateway;
use crate::infrastructure::offline::{SqliteMirrorStore, SqliteMutationQueueStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything the offline sync engine needs, wired from one `AppConfig`.
#[derive(Clone)]
pub struct SyncEngine {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub queue: Arc<MutationQueueService>,
    pub mirror: Arc<MirrorService>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub connectivity: Arc<ConnectivityMonitor>,
}

impl SyncEngine {
    pub async fn initialize(config: AppConfig) -> Result<Self, AppError> {
        Self::build(config, None).await
    }

    pub async fn initialize_with_notifier(
        config: AppConfig,
        notifier: Arc<dyn SyncNotifier>,
    ) -> Result<Self, AppError> {
        Self::build(config, Some(notifier)).await
    }

    async fn build(
        config: AppConfig,
        notifier: Option<Arc<dyn SyncNotifier>>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;
        // reject a bad gateway url before touching the database
        let gateway = Arc::new(HttpMutationGateway::from_config(&config.gateway)?);
        let pool = ConnectionPool::open(&config.database).await?;
        Ok(Self::assemble(config, pool, gateway, notifier))
    }

    fn assemble(
        config: AppConfig,
        pool: ConnectionPool,
        gateway: Arc<HttpMutationGateway>,
        notifier: Option<Arc<dyn SyncNotifier>>,
    ) -> Self {
        let queue_store = Arc::new(SqliteMutationQueueStore::new(pool.get_pool().clone()));
        let mirror_store = Arc::new(SqliteMirrorStore::new(pool.get_pool().clone()));

        let mut orchestrator = SyncOrchestrator::new(queue_store.clone(), gateway);
        if let Some(notifier) = notifier {
            orchestrator = orchestrator.with_notifier(notifier);
        }

        Self {
            config,
            pool,
            queue: Arc::new(MutationQueueService::new(queue_store)),
            mirror: Arc::new(MirrorService::new(mirror_store)),
            orchestrator: Arc::new(orchestrator),
            connectivity: Arc::new(ConnectivityMonitor::new()),
        }
    }

    /// Subscribes the orchestrator to connectivity events.
    pub fn attach_orchestrator(&self) -> SubscriptionId {
        self.connectivity
            .register(self.orchestrator.trigger_handler())
    }

    /// Starts the health probe when enabled. Requires a running tokio runtime.
    pub fn spawn_probe(&self) -> Result<Option<JoinHandle<()>>, AppError> {
        if !self.config.connectivity.probe_enabled {
            tracing::info!(target: "offline::connectivity", "health probe disabled");
            return Ok(None);
        }
        let probe = HealthProbe::from_config(&self.config, Arc::clone(&self.connectivity))?;
        Ok(Some(probe.spawn()))
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
