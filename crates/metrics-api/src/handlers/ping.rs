//! `GET /ping` — backend health check: 200 "OK" if the storage backend
//! answers, 503 otherwise.

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

pub async fn ping(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(err) => {
            tracing::error!(error = %err, "backend health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

#[cfg(test)]
#[path = "ping_tests.rs"]
mod tests;
