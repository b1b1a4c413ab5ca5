//! Trusted-subnet admission: when a CIDR is configured, only requests
//! whose `X-Real-IP` header falls inside it are admitted.

use crate::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_core::wire::headers::X_REAL_IP;
use std::net::IpAddr;
use std::sync::Arc;

pub async fn admit_trusted_subnet(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(subnet) = state.trusted_subnet else {
        return next.run(req).await;
    };

    let header_value = req
        .headers()
        .get(X_REAL_IP)
        .and_then(|v| v.to_str().ok());

    let Some(header_value) = header_value else {
        tracing::warn!("rejected request missing X-Real-IP under trusted-subnet policy");
        return (StatusCode::FORBIDDEN, "missing X-Real-IP header").into_response();
    };

    let Ok(addr) = header_value.parse::<IpAddr>() else {
        tracing::warn!(value = header_value, "rejected request with malformed X-Real-IP");
        return (StatusCode::FORBIDDEN, "malformed X-Real-IP header").into_response();
    };

    if !subnet.contains(addr) {
        tracing::warn!(%addr, "rejected request outside trusted subnet");
        return (StatusCode::FORBIDDEN, "client address is not in the trusted subnet").into_response();
    }

    next.run(req).await
}

#[cfg(test)]
#[path = "subnet_tests.rs"]
mod tests;
