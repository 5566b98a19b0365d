use std::sync::Arc;

use hookrelay::api::ApiServer;
use hookrelay::config::AppConfig;
use hookrelay::logging::init_logging;
use hookrelay::services::ServiceContainer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let (logging_config, _log_guard) = init_logging(config.log_dir.as_deref())?;
    let logging_config = Arc::new(logging_config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        public_url = %config.public_url,
        "Starting hookrelay"
    );

    let container = ServiceContainer::new(&config).await?;
    logging_config.start_retention_cleanup(container.cancellation_token());

    let server = ApiServer::with_state(
        config.server.clone(),
        container.app_state(Some(Arc::clone(&logging_config))),
    )
    .with_cancel_token(container.cancellation_token());

    let shutdown_token = container.cancellation_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Received shutdown signal");
        shutdown_token.cancel();
    });

    let result = server.run().await;
    container.shutdown().await;
    result?;

    info!("hookrelay stopped");
    Ok(())
}
