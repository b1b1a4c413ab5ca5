//! One handler per row of the HTTP surface table: the legacy plain-text
//! endpoints, the JSON single-metric endpoints, the batch endpoint, the
//! HTML dashboard, and the backend health check.

mod dashboard;
mod legacy;
mod ping;
mod value_json;
mod updates_batch;
mod update_json;

pub use dashboard::dashboard;
pub use legacy::{update_legacy, value_legacy};
pub use ping::ping;
pub use update_json::update_json;
pub use updates_batch::updates_batch;
pub use value_json::value_json;

use crate::AppState;
use axum::http::HeaderMap;
use metrics_core::wire::headers::X_REAL_IP;
use std::sync::Arc;

/// Publish an audit event after a successful ingest, using the caller's
/// `X-Real-IP` header if present (falling back to `"unknown"` — audit
/// publication is best-effort and must never block or fail the response).
pub(crate) async fn publish_audit(state: &Arc<AppState>, headers: &HeaderMap, metric_ids: Vec<String>) {
    let client_ip = headers
        .get(X_REAL_IP)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let event = metrics_core::audit::AuditEvent::new(chrono::Utc::now(), metric_ids, client_ip);
    state.audit.notify(&event).await;
}
