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
async fn gauge_update_echoes_the_submitted_value() {
    let app = build_router(test_state());

    let response = post_json(
        app,
        "/update/",
        serde_json::json!({"id": "cpu", "type": "gauge", "value": 42.5}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["value"], 42.5);
}

#[tokio::test]
async fn counter_update_echoes_the_accumulated_total_not_the_delta() {
    let app = build_router(test_state());

    post_json(
        app.clone(),
        "/update/",
        serde_json::json!({"id": "requests", "type": "counter", "delta": 10}),
    )
    .await;
    let response = post_json(
        app,
        "/update/",
        serde_json::json!({"id": "requests", "type": "counter", "delta": 5}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["delta"], 15);
}

#[tokio::test]
async fn unknown_metric_type_is_a_validation_error() {
    let app = build_router(test_state());

    let response = post_json(
        app,
        "/update/",
        serde_json::json!({"id": "cpu", "type": "histogram", "value": 1.0}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gauge_missing_value_field_is_a_validation_error() {
    let app = build_router(test_state());

    let response = post_json(app, "/update/", serde_json::json!({"id": "cpu", "type": "gauge"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
