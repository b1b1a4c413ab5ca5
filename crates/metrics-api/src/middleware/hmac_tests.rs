use crate::storage::MemoryStore;
use crate::{build_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_core::audit::AuditSubject;
use metrics_core::crypto::hash;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state(hmac_key: &str) -> Arc<AppState> {
    Arc::new(AppState {
        store: Arc::new(MemoryStore::new()),
        audit: Arc::new(AuditSubject::new()),
        hmac_key: hmac_key.to_string(),
        private_key: None,
        trusted_subnet: None,
    })
}

fn metric_body() -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({"id": "cpu", "type": "gauge", "value": 1.0})).unwrap()
}

#[tokio::test]
async fn matching_signature_is_accepted() {
    let key = "shared-secret";
    let state = test_state(key);
    let app = build_router(state);
    let body = metric_body();
    let signature = hash::sign(&body, key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/")
                .header("Content-Type", "application/json")
                .header("HashSHA256", signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn mismatched_signature_is_rejected() {
    let key = "shared-secret";
    let state = test_state(key);
    let app = build_router(state);
    let body = metric_body();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/")
                .header("Content-Type", "application/json")
                .header("HashSHA256", "deadbeef")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_header_with_key_configured_is_allowed() {
    let key = "shared-secret";
    let state = test_state(key);
    let app = build_router(state);
    let body = metric_body();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/")
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn present_header_with_no_key_configured_is_ignored() {
    let state = test_state("");
    let app = build_router(state);
    let body = metric_body();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/")
                .header("Content-Type", "application/json")
                .header("HashSHA256", "not-even-hex-garbage!!")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
