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

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn legacy_gauge_update_then_read_round_trips() {
    let app = build_router(test_state());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/gauge/cpu/42.5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/value/gauge/cpu").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "42.5");
}

#[tokio::test]
async fn legacy_counter_updates_accumulate() {
    let app = build_router(test_state());

    for delta in ["10", "5", "-3"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/update/counter/req/{delta}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(Request::builder().uri("/value/counter/req").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "12");
}

#[tokio::test]
async fn unknown_legacy_metric_type_is_a_validation_error() {
    let app = build_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/histogram/cpu/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reading_unknown_legacy_metric_is_404() {
    let app = build_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/value/gauge/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
