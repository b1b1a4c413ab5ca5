use super::*;
use crate::dispatch::client::{build_http_client, DispatchDeps};
use metrics_core::retry::RetryPolicy;
use metrics_core::wire::Metric;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn deps_for(server: &MockServer) -> DispatchDeps {
    DispatchDeps {
        client: build_http_client(),
        server_address: server.uri(),
        hmac_key: String::new(),
        public_key: None,
        retry_policy: RetryPolicy::fast(),
        outbound_ip: "10.0.0.1".to_string(),
    }
}

#[tokio::test]
async fn posts_gzipped_json_with_real_ip_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update/"))
        .and(header("Content-Encoding", "gzip"))
        .and(header("X-Real-IP", "10.0.0.1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let deps = deps_for(&server);
    let metric = Metric::gauge("HeapAlloc", 42.0);

    send_metric(&deps, &metric).await.expect("dispatch should succeed");
}

#[tokio::test]
async fn signs_body_when_hmac_key_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut deps = deps_for(&server);
    deps.hmac_key = "shared-secret".to_string();
    let metric = Metric::counter("PollCount", 3);

    send_metric(&deps, &metric).await.expect("dispatch should succeed");

    let requests = server.received_requests().await.expect("mock server tracks requests");
    let request = requests.first().expect("one request was made");
    assert!(request.headers.get("hashsha256").is_some());
}

#[tokio::test]
async fn retries_on_non_success_and_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut deps = deps_for(&server);
    deps.retry_policy = RetryPolicy::new(2, vec![std::time::Duration::from_millis(5)]);
    let metric = Metric::gauge("HeapAlloc", 1.0);

    let result = send_metric(&deps, &metric).await;
    assert!(result.is_err());

    let seen = server.received_requests().await.expect("mock server tracks requests");
    assert_eq!(seen.len(), 2, "should attempt exactly max_attempts times");
}
