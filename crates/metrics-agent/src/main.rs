//! # Metrics Agent
//!
//! Binary entry point for the sampling and dispatch agent.
//!
//! This executable:
//! - Resolves configuration from environment, flags, and an optional file
//! - Initializes logging
//! - Spawns the runtime and system samplers, the aggregator/forwarder,
//!   and the bounded worker pool
//! - Waits for SIGINT/SIGTERM, then drains a final report and shuts down

mod aggregator;
mod config;
mod dispatch;
mod sampler;

use clap::Parser;
use config::{AgentSettings, Cli};
use dispatch::{build_http_client, outbound_interface_ip, DispatchDeps, WorkerPool};
use metrics_core::crypto::cipher;
use sampler::CHANNEL_CAPACITY;
use std::sync::atomic::AtomicI64;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metrics_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = match AgentSettings::resolve(cli) {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "invalid agent configuration");
            std::process::exit(3);
        }
    };

    info!(
        address = %settings.server_address,
        poll_interval_secs = settings.poll_interval.as_secs(),
        report_interval_secs = settings.report_interval.as_secs(),
        batch_size = settings.batch_size,
        rate_limit = settings.rate_limit,
        "starting metrics agent"
    );

    let public_key = match &settings.public_key_path {
        Some(path) => {
            let pem = std::fs::read_to_string(path).map_err(|e| {
                format!("failed to read public key file {}: {e}", path.display())
            })?;
            let key = cipher::load_public_key(&pem)
                .map_err(|e| format!("invalid public key {}: {e}", path.display()))?;
            Some(Arc::new(key))
        }
        None => None,
    };

    let deps = Arc::new(DispatchDeps {
        client: build_http_client(),
        server_address: settings.server_address.clone(),
        hmac_key: settings.hmac_key.clone(),
        public_key,
        retry_policy: settings.retry_policy.clone(),
        outbound_ip: outbound_interface_ip(),
    });

    let (runtime_tx, runtime_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (system_tx, system_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let poll_count = Arc::new(AtomicI64::new(0));
    let cancel = CancellationToken::new();

    let runtime_handle = sampler::spawn_runtime_sampler(
        runtime_tx,
        Arc::clone(&poll_count),
        settings.poll_interval,
        cancel.clone(),
    );
    let system_handle =
        sampler::spawn_system_sampler(system_tx, settings.poll_interval, cancel.clone());

    let pool = WorkerPool::new(settings.rate_limit, Arc::clone(&deps));
    let pool_handle = pool.handle().expect("worker pool was just created");

    let aggregator_handle = aggregator::spawn_aggregator(
        runtime_rx,
        system_rx,
        Arc::clone(&poll_count),
        pool_handle,
        Arc::clone(&deps),
        settings.batch_size,
        settings.report_interval,
        cancel.clone(),
    );

    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining final report");
    cancel.cancel();

    if let Err(err) = runtime_handle.await {
        error!(error = %err, "runtime sampler task panicked");
    }
    if let Err(err) = system_handle.await {
        error!(error = %err, "system sampler task panicked");
    }
    if let Err(err) = aggregator_handle.await {
        error!(error = %err, "aggregator task panicked");
    }
    pool.stop().await;

    info!("metrics agent shutdown complete");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { info!("received SIGINT"); }
        _ = terminate => { info!("received SIGTERM"); }
    }
}
