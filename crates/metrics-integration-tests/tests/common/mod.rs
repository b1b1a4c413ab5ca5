//! Shared fixtures for the cross-crate ingest scenarios: a bare
//! `AppState` builder and small request helpers over
//! `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_api::storage::MemoryStore;
use metrics_api::AppState;
use metrics_core::audit::AuditSubject;
use rsa::RsaPrivateKey;
use std::sync::Arc;
use tower::ServiceExt;

#[allow(dead_code)]
pub struct StateBuilder {
    store: Option<Arc<dyn metrics_api::storage::MetricStore>>,
    audit: Option<Arc<AuditSubject>>,
    hmac_key: String,
    private_key: Option<RsaPrivateKey>,
    trusted_subnet: Option<ipnetwork::IpNetwork>,
}

#[allow(dead_code)]
impl StateBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            audit: None,
            hmac_key: String::new(),
            private_key: None,
            trusted_subnet: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn metrics_api::storage::MetricStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_audit(mut self, audit: Arc<AuditSubject>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_hmac_key(mut self, key: impl Into<String>) -> Self {
        self.hmac_key = key.into();
        self
    }

    pub fn with_private_key(mut self, key: RsaPrivateKey) -> Self {
        self.private_key = Some(key);
        self
    }

    pub fn with_trusted_subnet(mut self, cidr: &str) -> Self {
        self.trusted_subnet = Some(cidr.parse().expect("valid test CIDR"));
        self
    }

    pub fn build(self) -> Arc<AppState> {
        Arc::new(AppState {
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            audit: self.audit.unwrap_or_else(|| Arc::new(AuditSubject::new())),
            hmac_key: self.hmac_key,
            private_key: self.private_key,
            trusted_subnet: self.trusted_subnet,
        })
    }
}

#[allow(dead_code)]
pub async fn post_json(app: axum::Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .header("X-Real-IP", "127.0.0.1")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn post_json_from(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
    client_ip: &str,
) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .header("X-Real-IP", client_ip)
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("X-Real-IP", "127.0.0.1")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    assert_eq!(response.status(), StatusCode::OK, "expected 200 before parsing JSON body");
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
