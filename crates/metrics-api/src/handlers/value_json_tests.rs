use crate::storage::MemoryStore;
use crate::{build_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_core::audit::AuditSubject;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> Arc<AppState> {
    Arc::new(AppState {
        store: Arc::new(MemoryStore::new()),
        audit: Arc::new(AuditSubject::new()),
        hmac_key: String::new(),
        private_key: None,
        trusted_subnet: None,
    })
}

async fn post_json(app: axum::Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn reads_back_a_stored_gauge() {
    let app = build_router(test_state());

    post_json(
        app.clone(),
        "/update/",
        serde_json::json!({"id": "cpu", "type": "gauge", "value": 7.0}),
    )
    .await;

    let response = post_json(app, "/value/", serde_json::json!({"id": "cpu", "type": "gauge"})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["value"], 7.0);
}

#[tokio::test]
async fn reads_back_an_accumulated_counter() {
    let app = build_router(test_state());

    post_json(
        app.clone(),
        "/update/",
        serde_json::json!({"id": "requests", "type": "counter", "delta": 4}),
    )
    .await;
    post_json(
        app.clone(),
        "/update/",
        serde_json::json!({"id": "requests", "type": "counter", "delta": 6}),
    )
    .await;

    let response = post_json(
        app,
        "/value/",
        serde_json::json!({"id": "requests", "type": "counter"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["delta"], 10);
}

#[tokio::test]
async fn unknown_metric_is_not_found() {
    let app = build_router(test_state());

    let response = post_json(app, "/value/", serde_json::json!({"id": "missing", "type": "gauge"})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
