//! Sync worker binary.

use anyhow::Context;
use tracing::{error, info, warn};

use cdsync_config::AppConfig;
use cdsync_worker::{telemetry, AppContext};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    telemetry::init_tracing(telemetry::level_from_env());

    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed");
    }

    info!("Starting cdsync-worker");

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Worker shutdown complete");
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        "Worker config: project_id={}, log_level={}, allowed_domains={:?}",
        config.firebase.project_id, config.system.log_level, config.system.allowed_domains
    );

    let ctx = AppContext::initialize(config)
        .await
        .context("Failed to initialize application context")?;

    info!(
        domains = ctx.config.domain_api.len(),
        "Worker ready, waiting for shutdown signal"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to install CTRL+C handler")?;
    info!("Received shutdown signal");

    Ok(())
}
