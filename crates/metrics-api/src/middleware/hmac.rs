//! HMAC-SHA256 request integrity verification.
//!
//! Checked against the gzip-compressed, pre-encryption body the gzip and
//! decrypt stages stashed as a request extension (see [`super::HmacInput`]),
//! not the current (by now fully decoded) body.

use super::HmacInput;
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_core::crypto::hash;
use metrics_core::wire::headers::HASH_SHA256;
use std::sync::Arc;

pub async fn verify_hmac(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let signature = req
        .headers()
        .get(HASH_SHA256)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    match (state.hmac_key.is_empty(), &signature) {
        // No key configured: a present header is ignored; proceed either way.
        (true, _) => return next.run(req).await,
        // Key configured but no header sent: allowed for backwards compatibility.
        (false, None) => return next.run(req).await,
        (false, Some(_)) => {}
    }

    let signature = signature.expect("checked above");
    let body = req
        .extensions()
        .get::<HmacInput>()
        .map(|h| h.0.clone())
        .unwrap_or_default();

    match hash::verify(&body, &signature, &state.hmac_key) {
        Ok(()) => next.run(req).await,
        Err(err) => {
            tracing::warn!(error = %err, "rejected request with invalid HMAC signature");
            (StatusCode::FORBIDDEN, "HMAC signature does not match").into_response()
        }
    }
}

#[cfg(test)]
#[path = "hmac_tests.rs"]
mod tests;
