//! yieldwatch Exporter — Entry Point
//!
//! Polls the yieldwatch API for one wallet and republishes its vault
//! positions as Prometheus gauges. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Parse flags, load optional config file, validate
//! 2. Init tracing (JSON structured logging on stdout)
//! 3. Build the metric registry
//! 4. Bind the metrics listener (fatal on failure)
//! 5. Spawn the `/metrics` server
//! 6. Run the poller until SIGINT; a failed metrics server exits non-zero

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use yieldwatch_exporter::adapters::api::YieldwatchClient;
use yieldwatch_exporter::adapters::metrics::ExporterMetrics;
use yieldwatch_exporter::config::cli::Cli;
use yieldwatch_exporter::config::loader;
use yieldwatch_exporter::usecases::{run_until_shutdown, Poller};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Flags + optional config file ─────────────────────
    let cli = Cli::parse();
    let config = loader::resolve(&cli).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.exporter.log_level)),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        wallet = %config.exporter.wallet,
        port = config.exporter.port,
        interval_secs = config.exporter.poll_interval_seconds,
        farm_label = config.exporter.include_farm_label,
        "Starting yieldwatch exporter"
    );

    if config.exporter.wallet.is_empty() {
        warn!("No wallet configured, every poll will fail upstream");
    }

    // ── 3. Metric registry ──────────────────────────────────
    let metrics = Arc::new(
        ExporterMetrics::new(config.label_schema()).context("Failed to register metrics")?,
    );

    // ── 4. Bind listener before polling starts ──────────────
    let addr = SocketAddr::from(([0, 0, 0, 0], config.exporter.port));
    let listener = ExporterMetrics::bind(addr).await?;
    info!(port = config.exporter.port, "Press Ctrl+C to stop the exporter");

    let client = Arc::new(
        YieldwatchClient::new(config.client_config()).context("Failed to create yieldwatch client")?,
    );
    let poller = Poller::new(
        client,
        Arc::clone(&metrics),
        config.exporter.wallet.clone(),
        config.poll_interval(),
    );

    let shutdown = CancellationToken::new();

    // ── 5. Metrics server ───────────────────────────────────
    let server = tokio::spawn(Arc::clone(&metrics).serve(listener, shutdown.clone()));

    // ── 6. Poll until SIGINT or server failure ──────────────
    run_until_shutdown(&poller, server, shutdown, sigint()).await?;

    println!("Stopping");
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on SIGINT. If the handler cannot be installed the exporter
/// keeps running; it then has to be stopped some other way.
async fn sigint() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT, Ctrl+C will not stop the exporter");
        std::future::pending::<()>().await;
    }
}
