//! # Metrics Ingest API
//!
//! HTTP server for receiving metric reports from agents and serving them
//! back out.
//!
//! This service provides:
//! - Legacy plain-text and JSON single-metric update/read endpoints
//! - A JSON batch-update endpoint
//! - An HTML dashboard and a backend health check
//! - The framing middleware chain: request logging, gzip, trusted-subnet
//!   admission, RSA-OAEP decryption, and HMAC-SHA256 verification

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod storage;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use errors::ServiceError;
use ipnetwork::IpNetwork;
use metrics_core::audit::AuditSubject;
use rsa::RsaPrivateKey;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::MetricStore;
use tracing::info;

// Re-export the types callers outside this crate most commonly need.
pub use errors::{ConfigError, IngestError};

/// Shared application state behind every handler and stateful middleware
/// stage. Always handed around as `Arc<AppState>` rather than cloned —
/// the store and audit subject are themselves internally shared, but the
/// struct as a whole has no reason to be duplicated per request.
pub struct AppState {
    /// The storage backend selected at startup.
    pub store: Arc<dyn MetricStore>,

    /// Fanout for accepted-ingest audit events.
    pub audit: Arc<AuditSubject>,

    /// Shared HMAC-SHA256 key. Empty string disables signature
    /// verification entirely.
    pub hmac_key: String,

    /// Private key used to decrypt `X-Encrypted: true` request bodies.
    /// `None` means the server cannot accept encrypted traffic.
    pub private_key: Option<RsaPrivateKey>,

    /// CIDR that `X-Real-IP` must fall within. `None` disables the
    /// admission check.
    pub trusted_subnet: Option<IpNetwork>,
}

/// Assemble the full router: every route, wrapped in the framing
/// middleware chain in the required order (outermost first): request
/// logging, gzip, trusted-subnet admission, decryption, HMAC
/// verification, and (JSON routes only) a content-type guard closest to
/// the handler.
///
/// Each concern gets its own `from_fn[_with_state]` layer over a merge
/// of per-concern sub-routers; `.layer()` wraps outside-in, so the last
/// call here ends up outermost at request time.
pub fn build_router(state: Arc<AppState>) -> Router {
    let json_routes = Router::new()
        .route("/update/", post(handlers::update_json))
        .route("/value/", post(handlers::value_json))
        .route("/updates/", post(handlers::updates_batch))
        .layer(axum_middleware::from_fn(middleware::require_json_content_type));

    let legacy_routes = Router::new()
        .route("/update/{type}/{name}/{value}", post(handlers::update_legacy))
        .route("/value/{type}/{name}", get(handlers::value_legacy));

    let misc_routes = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/ping", get(handlers::ping));

    Router::new()
        .merge(json_routes)
        .merge(legacy_routes)
        .merge(misc_routes)
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::verify_hmac,
        ))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::decrypt_body,
        ))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::admit_trusted_subnet,
        ))
        .layer(axum_middleware::from_fn(middleware::gzip_framing))
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

/// Bind `address` and serve `router` until `shutdown` resolves, then
/// return once in-flight requests have drained.
///
/// The shutdown signal itself is the caller's responsibility so
/// `metrics-server`'s `main` can flush storage and join background tasks
/// after the listener has actually stopped.
pub async fn serve(
    router: Router,
    address: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServiceError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: address.to_string(),
            message: e.to_string(),
        })?;

    info!(%address, "starting metrics ingest server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("metrics ingest server shutdown complete");
    Ok(())
}
