//! Trusted-subnet admission: requests outside the configured CIDR are
//! rejected before reaching a handler, requests inside it pass through,
//! and an unconfigured subnet admits everything.

mod common;

use common::{post_json_from, StateBuilder};
use metrics_api::build_router;

#[tokio::test]
async fn address_outside_the_trusted_subnet_is_rejected() {
    let state = StateBuilder::new().with_trusted_subnet("10.0.0.0/8").build();
    let router = build_router(state);

    let response = post_json_from(
        router,
        "/update/",
        serde_json::json!({"id": "cpu", "type": "gauge", "value": 1.0}),
        "192.168.1.1",
    )
    .await;

    assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn address_inside_the_trusted_subnet_is_admitted() {
    let state = StateBuilder::new().with_trusted_subnet("10.0.0.0/8").build();
    let router = build_router(state);

    let response = post_json_from(
        router,
        "/update/",
        serde_json::json!({"id": "cpu", "type": "gauge", "value": 1.0}),
        "10.0.0.5",
    )
    .await;

    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

#[tokio::test]
async fn missing_real_ip_header_is_rejected_when_a_subnet_is_configured() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let state = StateBuilder::new().with_trusted_subnet("10.0.0.0/8").build();
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update/")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&serde_json::json!({"id": "cpu", "type": "gauge", "value": 1.0}))
                        .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn no_subnet_configured_admits_any_address() {
    let state = StateBuilder::new().build();
    let router = build_router(state);

    let response = post_json_from(
        router,
        "/update/",
        serde_json::json!({"id": "cpu", "type": "gauge", "value": 1.0}),
        "203.0.113.9",
    )
    .await;

    assert_eq!(response.status(), axum::http::StatusCode::OK);
}
