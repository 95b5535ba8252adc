use std::sync::Arc;
use std::time::Duration;

use notify::{create_notification_service, NotificationHandle, QueueConfig};

use crate::catalog::Catalog;
use crate::config::{Config, ConfigError};
use crate::services::{
    AssetLookup, AssetProber, AssetStore, Enumerator, LivenessTracker, ScanOrchestrator,
    StatusService,
};

const USER_AGENT: &str = concat!("skinwatch/", env!("CARGO_PKG_VERSION"));

/// Everything the crawl loops and the operator API share
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub store: AssetStore,
    pub notifications: NotificationHandle,
    pub status: StatusService,
    pub lookup: AssetLookup,
    pub orchestrator: Arc<ScanOrchestrator>,
}

impl AppState {
    /// Wires the services with webhook notifiers from `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config, catalog: Catalog) -> Result<Self, ConfigError> {
        let http_client = build_http_client()?;
        let notifications = create_notification_service(
            &config.notification,
            http_client.clone(),
            QueueConfig::default(),
        );
        Ok(Self::with_notifications(
            config,
            catalog,
            http_client,
            notifications,
        ))
    }

    pub fn with_notifications(
        config: Config,
        catalog: Catalog,
        http_client: reqwest::Client,
        notifications: NotificationHandle,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let store = AssetStore::new(&config.data_path);
        let prober = AssetProber::with_timeout(http_client, config.probe_timeout);
        let liveness = Arc::new(LivenessTracker::new());

        let enumerator = Enumerator::new(
            prober.clone(),
            store.clone(),
            Arc::clone(&catalog),
            notifications.clone(),
            config.role_mention(),
        );
        let orchestrator = Arc::new(ScanOrchestrator::new(
            enumerator,
            Arc::clone(&catalog),
            Arc::clone(&liveness) as Arc<dyn crate::services::Heartbeat>,
        ));

        Self {
            status: StatusService::new(Arc::clone(&liveness), notifications.queue().clone()),
            lookup: AssetLookup::new(prober, Arc::clone(&catalog)),
            config: Arc::new(config),
            catalog,
            store,
            notifications,
            orchestrator,
        }
    }
}

fn build_http_client() -> Result<reqwest::Client, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(5))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
