//! RSA-OAEP chunked decryption: when `X-Encrypted: true` is present, the
//! body is ciphertext and must be decrypted before any later stage (HMAC
//! verification, JSON parsing) can see it.

use super::{HmacInput, MAX_BODY_BYTES};
use crate::AppState;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::http::header::CONTENT_ENCODING;
use metrics_core::crypto::{cipher, gzip};
use metrics_core::wire::headers::X_ENCRYPTED;
use std::sync::Arc;

pub async fn decrypt_body(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let is_encrypted = req
        .headers()
        .get(X_ENCRYPTED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if !is_encrypted {
        return next.run(req).await;
    }

    let Some(private_key) = &state.private_key else {
        tracing::warn!("request marked X-Encrypted but no private key is configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "server is not configured to decrypt request bodies",
        )
            .into_response();
    };

    let (parts, body) = req.into_parts();
    let ciphertext = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return (StatusCode::BAD_REQUEST, "failed to read request body").into_response(),
    };

    let plaintext = match cipher::decrypt(private_key, &ciphertext) {
        Ok(plaintext) => plaintext,
        Err(err) => {
            tracing::warn!(error = %err, "failed to decrypt request body");
            return (StatusCode::BAD_REQUEST, "failed to decrypt request body").into_response();
        }
    };

    let mut parts = parts;

    // `plaintext` here is the gzip-compressed bytes the sender signed
    // before encrypting — exactly the HMAC stage's input, so capture it
    // before going on to decompress for the handlers downstream.
    parts.extensions.insert(HmacInput(bytes::Bytes::from(plaintext.clone())));

    // The gzip middleware ran before this one and deliberately left an
    // encrypted body alone, since the ciphertext doesn't decompress — the
    // plaintext we just recovered is what it would have decompressed, so
    // finish that step here before handing off downstream.
    let was_gzipped = parts
        .headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("gzip"))
        .unwrap_or(false);

    let plaintext = if was_gzipped {
        match gzip::decompress(&plaintext) {
            Ok(decompressed) => decompressed,
            Err(err) => {
                tracing::warn!(error = %err, "failed to decompress decrypted request body");
                return (StatusCode::BAD_REQUEST, "malformed gzip body").into_response();
            }
        }
    } else {
        plaintext
    };

    parts.headers.remove(X_ENCRYPTED);
    parts.headers.remove(CONTENT_ENCODING);
    let req = Request::from_parts(parts, Body::from(plaintext));
    next.run(req).await
}
