use super::*;
use crate::dispatch::client::{build_http_client, DispatchDeps};
use metrics_core::retry::RetryPolicy;
use metrics_core::wire::Metric;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn deps_for(server: &MockServer) -> Arc<DispatchDeps> {
    Arc::new(DispatchDeps {
        client: build_http_client(),
        server_address: server.uri(),
        hmac_key: String::new(),
        public_key: None,
        retry_policy: RetryPolicy::fast(),
        outbound_ip: "10.0.0.1".to_string(),
    })
}

#[tokio::test]
async fn dispatches_submitted_jobs_through_the_pool() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;

    let pool = WorkerPool::new(2, deps_for(&server));
    let handle = pool.handle().expect("freshly created pool has a live handle");

    for i in 0..3 {
        handle.submit(WorkerJob::new(Metric::gauge(format!("g{i}"), i as f64), "runtime"));
    }

    // Give the workers a moment to drain the channel before asserting.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    pool.stop().await;

    server.verify().await;
}

#[tokio::test]
async fn submission_after_stop_is_dropped_not_panicked() {
    let server = MockServer::start().await;
    let pool = WorkerPool::new(1, deps_for(&server));
    let handle = pool.handle().expect("freshly created pool has a live handle");
    pool.stop().await;

    // The channel's receiver side is gone; submitting must not panic.
    handle.submit(WorkerJob::new(Metric::gauge("g", 1.0), "runtime"));
}
