//! Transparent request decompression and response compression.
//!
//! On `Content-Encoding: gzip`, the request body is decompressed before
//! reaching the handler. On `Accept-Encoding: gzip`, the response body is
//! compressed provided its content type is one we know decompresses
//! cleanly downstream (`application/json`, `text/html`, `text/plain`).

use super::{HmacInput, MAX_BODY_BYTES};
use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use metrics_core::crypto::gzip;
use metrics_core::wire::headers::X_ENCRYPTED;

const COMPRESSIBLE_TYPES: [&str; 3] = ["application/json", "text/html", "text/plain"];

pub async fn gzip_framing(req: Request, next: Next) -> Response {
    let wants_compressed_response = req
        .headers()
        .get(ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("gzip"))
        .unwrap_or(false);

    let req = match decompress_if_needed(req).await {
        Ok(req) => req,
        Err(response) => return response,
    };

    let response = next.run(req).await;

    if !wants_compressed_response {
        return response;
    }
    compress_if_eligible(response).await
}

async fn decompress_if_needed(req: Request) -> Result<Request, Response> {
    let is_gzipped = req
        .headers()
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("gzip"))
        .unwrap_or(false);

    // An encrypted body is ciphertext wrapping the gzip bytes, not gzip
    // itself — decompressing it here would fail. The decrypt stage runs
    // after this one and decompresses once it has recovered plaintext.
    let is_encrypted = req
        .headers()
        .get(X_ENCRYPTED)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // An encrypted body's HMAC input is recovered later by the decrypt
    // stage, which reads the ciphertext itself — nothing to capture here.
    if is_encrypted {
        return Ok(req);
    }

    let (mut parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Err((axum::http::StatusCode::BAD_REQUEST, "failed to read request body").into_response())
        }
    };

    // The raw body as received is exactly what the sender's HMAC covers,
    // whether or not it's gzip-compressed — stash it before any
    // decompression happens.
    parts.extensions.insert(HmacInput(bytes.clone()));

    if !is_gzipped {
        return Ok(Request::from_parts(parts, Body::from(bytes)));
    }

    let decompressed = match gzip::decompress(&bytes) {
        Ok(bytes) => bytes,
        Err(_) => {
            return Err((axum::http::StatusCode::BAD_REQUEST, "malformed gzip body").into_response())
        }
    };

    parts.headers.remove(CONTENT_ENCODING);
    Ok(Request::from_parts(parts, Body::from(decompressed)))
}

async fn compress_if_eligible(response: Response) -> Response {
    let content_type_is_compressible = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let base = v.split(';').next().unwrap_or(v).trim();
            COMPRESSIBLE_TYPES.contains(&base)
        })
        .unwrap_or(false);

    if !content_type_is_compressible {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    match gzip::compress(&bytes) {
        Ok(compressed) => {
            parts.headers.insert(CONTENT_ENCODING, "gzip".parse().unwrap());
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(compressed))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
