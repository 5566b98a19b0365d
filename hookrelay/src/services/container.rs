//! Service container for dependency injection.
//!
//! Builds storage, the chat sink and the relay pipeline from an
//! [`AppConfig`], and owns the cancellation token of background tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::Result;
use crate::api::AppState;
use crate::config::AppConfig;
use crate::database::repositories::{
    SqlxAuditRepository, SqlxDestinationRepository, SqlxEventModifierRepository,
    SqlxRepoBindingRepository,
};
use crate::database::{self, DbPool};
use crate::delivery::{ChatSink, DiscordSink};
use crate::logging::LoggingConfig;
use crate::relay::{RelayService, RelayStores};
use crate::utils::http_client::build_chat_client;

/// Timeout of a single chat API request.
const CHAT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default shutdown timeout.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ServiceContainer {
    /// Database connection pool.
    pub pool: DbPool,
    pub relay: Arc<RelayService>,
    admin_token: Option<String>,
    retention_task: std::sync::Mutex<Option<JoinHandle<()>>>,
    cancellation_token: CancellationToken,
}

impl ServiceContainer {
    /// Connect to the database, migrate it and build the Discord-backed relay.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let pool = database::init_pool(&config.database_url).await?;
        database::run_migrations(&pool).await?;

        let client = build_chat_client(CHAT_REQUEST_TIMEOUT);
        let sink: Arc<dyn ChatSink> = Arc::new(DiscordSink::new(
            client,
            config.discord_api_base.clone(),
            config.discord_token.clone(),
        ));

        let container = Self::with_sink(pool, sink, &config.public_url)
            .with_admin_token(config.admin_token.clone());
        container.start_audit_retention(config.audit_retention_days);
        Ok(container)
    }

    /// Build the relay over an existing (migrated) pool and an arbitrary sink.
    pub fn with_sink(pool: DbPool, sink: Arc<dyn ChatSink>, public_url: &str) -> Self {
        let stores = RelayStores {
            destinations: Arc::new(SqlxDestinationRepository::new(pool.clone())),
            bindings: Arc::new(SqlxRepoBindingRepository::new(pool.clone())),
            modifiers: Arc::new(SqlxEventModifierRepository::new(pool.clone())),
            audit: Arc::new(SqlxAuditRepository::new(pool.clone())),
        };
        let relay = Arc::new(RelayService::new(stores, sink, public_url));

        info!("Services initialized");

        Self {
            pool,
            relay,
            admin_token: None,
            retention_task: std::sync::Mutex::new(None),
            cancellation_token: CancellationToken::new(),
        }
    }

    fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token;
        self
    }

    /// Start the periodic audit purge. No-op when `days` is 0.
    pub fn start_audit_retention(&self, days: u32) {
        let handle = self
            .relay
            .audit()
            .spawn_retention_task(days, self.cancellation_token.clone());
        if let Some(handle) = handle {
            info!(days, "Audit retention enabled");
            if let Ok(mut slot) = self.retention_task.lock() {
                *slot = Some(handle);
            }
        }
    }

    /// Handler state sharing this container's services.
    pub fn app_state(&self, logging_config: Option<Arc<LoggingConfig>>) -> AppState {
        let mut state = AppState::new()
            .with_relay(Arc::clone(&self.relay))
            .with_db_pool(self.pool.clone());
        if let Some(config) = logging_config {
            state = state.with_logging_config(config);
        }
        if let Some(token) = &self.admin_token {
            state = state.with_admin_token(token.clone());
        }
        state
    }

    /// Get the cancellation token for external use.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Check if shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Stop background tasks and close the pool.
    pub async fn shutdown(&self) {
        info!("Shutting down services");
        self.cancellation_token.cancel();

        let task = self.retention_task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            if tokio::time::timeout(DEFAULT_SHUTDOWN_TIMEOUT, task).await.is_err() {
                warn!("Audit retention task did not stop in time");
            }
        }

        self.pool.close().await;
        info!("Services shut down");
    }
}
