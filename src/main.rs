#![allow(dead_code)]

mod config;
mod constants;
mod depth_builder;
mod models;
mod oracle;
mod pricing;
mod session;
mod signing;
mod telemetry;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::oracle::StaticOracle;
use crate::session::{Session, Supervisor};
use crate::signing::QuoteSigner;
use crate::telemetry::metrics::SessionMetrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("================================================");
    info!("  darkpool-mm — RFQ market-maker session agent");
    info!("================================================");

    let config = Config::load_or_default()?;
    config.validate()?;

    if config.is_dry_run() {
        warn!("DRY RUN MODE — quotes will be signed with a random key");
    }

    let manager = constants::rfq_manager(config.hub.chain_id)
        .ok_or_else(|| anyhow::anyhow!("no RFQ manager configured for chain id {}", config.hub.chain_id))?;

    let signer = Arc::new(QuoteSigner::new(config.hub.chain_id, &config.signer.private_key));
    info!(signer_address = %signer.address(), "quote signer ready");

    let oracle = Arc::new(StaticOracle::with_prices(
        config
            .pairs
            .iter()
            .map(|pair| (pair.base_token, pair.quote_token, pair.price)),
    ));
    let metrics = SessionMetrics::new();

    info!(pairs = config.pairs.len(), "registered trading pairs");
    for pair in &config.pairs {
        info!(pair_id = %pair.pair_id(), "pair");
    }

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let session = Session::new(
        config.hub.clone(),
        manager,
        config.pairs.clone(),
        oracle,
        signer,
        metrics.clone(),
    );
    let supervisor = Supervisor::new(session, metrics);

    let shutdown_tx_run = shutdown_tx.clone();
    let run_handle = tokio::spawn(async move {
        supervisor.run(&shutdown_tx_run).await;
    });

    info!("darkpool-mm running. Press Ctrl+C to shut down.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping session");
    let _ = shutdown_tx.send(());

    if let Err(e) = run_handle.await {
        error!(error = %e, "supervisor task panicked");
    }

    info!("darkpool-mm shutdown complete");
    Ok(())
}
