//! Request logging middleware: method, URI, status, response bytes, and
//! duration, one `tracing` event per request.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let response = next.run(req).await;

    let duration = started.elapsed();
    let bytes = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info!(
        %method,
        %uri,
        status = response.status().as_u16(),
        bytes,
        duration_ms = duration.as_millis() as u64,
        "handled request"
    );

    response
}
