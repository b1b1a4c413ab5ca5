//! The shared HTTP client and per-request dependencies every dispatch path
//! (single-metric worker, batch sender) is built from.

use metrics_core::retry::RetryPolicy;
use rsa::RsaPublicKey;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything a dispatch call needs beyond the metric(s) themselves:
/// where to send them, how to sign/encrypt them, and under what retry
/// schedule.
#[derive(Clone)]
pub struct DispatchDeps {
    pub client: reqwest::Client,
    pub server_address: String,
    pub hmac_key: String,
    pub public_key: Option<Arc<RsaPublicKey>>,
    pub retry_policy: RetryPolicy,
    pub outbound_ip: String,
}

/// Build the `reqwest::Client` shared by every worker and the batch
/// sender. A single client (and its connection pool) is reused across
/// all dispatches rather than built per request.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(HTTP_CLIENT_TIMEOUT)
        .build()
        .expect("reqwest client configuration is valid")
}

/// Determine the local address this process would use to reach the
/// outside world, for the `X-Real-IP` header.
///
/// This never actually sends a packet: connecting a UDP socket only
/// resolves the local interface the kernel would route through. Falls
/// back to `"127.0.0.1"` if no route exists (e.g. an offline sandbox).
pub fn outbound_interface_ip() -> String {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}
