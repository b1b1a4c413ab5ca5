//! Content-type guard for the three JSON endpoints (`/update/`, `/value/`,
//! `/updates/`): reject anything but `application/json`, ignoring any
//! `charset=...` parameter.

use axum::extract::Request;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub async fn require_json_content_type(req: Request, next: Next) -> Response {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let base = content_type.split(';').next().unwrap_or("").trim();
    if !base.eq_ignore_ascii_case("application/json") {
        return (
            StatusCode::BAD_REQUEST,
            format!("unsupported content type '{base}', expected application/json"),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
#[path = "content_type_tests.rs"]
mod tests;
