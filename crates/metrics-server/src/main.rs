//! # Metrics Server
//!
//! Binary entry point for the metrics ingest HTTP service.
//!
//! This executable:
//! - Resolves configuration from environment, flags, and an optional file
//! - Initializes logging
//! - Selects a storage backend (relational DSN beats file path beats
//!   in-memory) and an audit fanout
//! - Serves the router from `metrics_api` until SIGINT/SIGTERM, then
//!   flushes storage and exits

use clap::Parser;
use metrics_api::config::{Cli, ServerSettings};
use metrics_api::errors::ServiceError;
use metrics_api::storage::{FileStore, MemoryStore, MetricStore, RelationalStore};
use metrics_api::AppState;
use metrics_core::audit::{AuditSubject, FileAuditObserver, RemoteAuditObserver};
use metrics_core::crypto::cipher;
use metrics_core::retry::RetryPolicy;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metrics_server=info,metrics_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = match ServerSettings::resolve(cli) {
        Ok(settings) => settings,
        Err(err) => {
            error!(error = %err, "invalid server configuration");
            std::process::exit(3);
        }
    };

    info!(
        address = %settings.address,
        store_interval_secs = settings.store_interval.as_secs(),
        relational = settings.database_dsn.is_some(),
        file_backed = settings.file_storage_path.is_some(),
        "starting metrics server"
    );

    let backend = match build_storage_backend(&settings).await {
        Ok(backend) => backend,
        Err(err) => {
            error!(error = %err, "failed to initialize storage backend");
            std::process::exit(1);
        }
    };

    let private_key = match &settings.private_key_path {
        Some(path) => {
            let pem = std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read private key file {}: {e}", path.display()))?;
            let key = cipher::load_private_key(&pem)
                .map_err(|e| format!("invalid private key {}: {e}", path.display()))?;
            Some(key)
        }
        None => None,
    };

    let trusted_subnet = match &settings.trusted_subnet {
        Some(cidr) => match cidr.parse() {
            Ok(network) => Some(network),
            Err(err) => {
                tracing::warn!(
                    %cidr,
                    error = %err,
                    "invalid TRUSTED_SUBNET configuration, degrading to allow-all"
                );
                None
            }
        },
        None => None,
    };

    let audit = Arc::new(AuditSubject::new());
    if let Some(path) = &settings.audit_file {
        audit.attach(Arc::new(FileAuditObserver::new(path.clone()))).await;
        info!(path = %path.display(), "attached file audit observer");
    }
    if let Some(url) = &settings.audit_url {
        audit.attach(Arc::new(RemoteAuditObserver::new(url.clone()))).await;
        info!(%url, "attached remote audit observer");
    }

    let state = Arc::new(AppState {
        store: Arc::clone(&backend.store),
        audit,
        hmac_key: settings.hmac_key.clone(),
        private_key,
        trusted_subnet,
    });

    let router = metrics_api::build_router(state);
    let address = settings.address;

    let serve_result = metrics_api::serve(router, address, wait_for_shutdown_signal()).await;

    info!("flushing storage before exit");
    if let Err(err) = backend.shutdown().await {
        error!(error = %err, "storage shutdown flush failed");
    }

    if let Err(err) = serve_result {
        error!(error = %err, "server exited with an error");
        let exit_code = match err {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
            ServiceError::StorageInit(_) => 4,
        };
        std::process::exit(exit_code);
    }

    info!("metrics server shutdown complete");
    Ok(())
}

/// The selected storage backend, kept alongside a type-erased handle for
/// shutdown so `main` can flush a file-backed store without downcasting.
struct StorageBackend {
    store: Arc<dyn MetricStore>,
    file: Option<Arc<FileStore>>,
}

impl StorageBackend {
    async fn shutdown(&self) -> Result<(), metrics_api::storage::StoreError> {
        match &self.file {
            Some(file) => file.shutdown().await,
            None => Ok(()),
        }
    }
}

/// Select the storage backend by priority: relational DSN beats a
/// file-backed store beats a bare in-memory map.
async fn build_storage_backend(
    settings: &ServerSettings,
) -> Result<StorageBackend, metrics_api::storage::StoreError> {
    if let Some(dsn) = &settings.database_dsn {
        let store = RelationalStore::connect(dsn, RetryPolicy::default_policy()).await?;
        info!("using relational storage backend");
        return Ok(StorageBackend {
            store: Arc::new(store),
            file: None,
        });
    }

    if let Some(path) = &settings.file_storage_path {
        let store = FileStore::new(path.clone(), settings.restore, settings.store_interval).await?;
        info!(path = %path.display(), "using file-backed storage backend");
        return Ok(StorageBackend {
            store: Arc::clone(&store) as Arc<dyn MetricStore>,
            file: Some(store),
        });
    }

    info!("using in-memory storage backend");
    Ok(StorageBackend {
        store: Arc::new(MemoryStore::new()),
        file: None,
    })
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
        _ = ctrl_c => { info!("received SIGINT, shutting down"); }
        _ = terminate => { info!("received SIGTERM, shutting down"); }
    }
}
