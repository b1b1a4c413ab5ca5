use crate::storage::MemoryStore;
use crate::{build_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use ipnetwork::IpNetwork;
use metrics_core::audit::AuditSubject;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state(trusted_subnet: Option<IpNetwork>) -> Arc<AppState> {
    Arc::new(AppState {
        store: Arc::new(MemoryStore::new()),
        audit: Arc::new(AuditSubject::new()),
        hmac_key: String::new(),
        private_key: None,
        trusted_subnet,
    })
}

#[tokio::test]
async fn request_outside_trusted_subnet_is_rejected() {
    let state = test_state(Some("10.0.0.0/8".parse().unwrap()));
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/ping")
                .header("X-Real-IP", "192.168.1.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn request_inside_trusted_subnet_is_admitted() {
    let state = test_state(Some("10.0.0.0/8".parse().unwrap()));
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/ping")
                .header("X-Real-IP", "10.0.0.5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn no_trusted_subnet_configured_admits_everything() {
    let state = test_state(None);
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().method("GET").uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
