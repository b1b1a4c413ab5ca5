//! `sendMetric`: encode, compress, optionally encrypt, sign,
//! and POST a single metric to `/update/`, under retry with a 15-second
//! deadline.

use super::client::DispatchDeps;
use super::{classify_dispatch_error, DispatchError};
use metrics_core::crypto::{cipher, gzip, hash};
use metrics_core::retry::with_retry;
use metrics_core::wire::headers::{
    ACCEPT_ENCODING, CONTENT_ENCODING, HASH_SHA256, X_ENCRYPTED, X_REAL_IP,
};
use metrics_core::wire::Metric;
use std::time::Duration;

const SINGLE_DISPATCH_DEADLINE: Duration = Duration::from_secs(15);

/// Send one metric to `{server_address}/update/`, retrying per
/// `deps.retry_policy` and giving up the whole attempt sequence if it
/// hasn't succeeded within 15 seconds.
pub async fn send_metric(deps: &DispatchDeps, metric: &Metric) -> Result<(), DispatchError> {
    let body = serde_json::to_vec(metric)?;
    let gzipped = gzip::compress(&body)?;

    let signature = if deps.hmac_key.is_empty() {
        None
    } else {
        Some(hash::sign(&gzipped, &deps.hmac_key)?)
    };

    let (payload, encrypted) = match &deps.public_key {
        Some(public_key) => (cipher::encrypt(public_key, &gzipped)?, true),
        None => (gzipped, false),
    };

    let url = format!("{}/update/", deps.server_address.trim_end_matches('/'));

    let attempt = || {
        let payload = payload.clone();
        let signature = signature.clone();
        let url = url.clone();
        async move {
            let mut request = deps
                .client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(CONTENT_ENCODING, "gzip")
                .header(ACCEPT_ENCODING, "gzip")
                .header(X_REAL_IP, deps.outbound_ip.as_str())
                .body(payload);

            if encrypted {
                request = request.header(X_ENCRYPTED, "true");
            }
            if let Some(signature) = &signature {
                request = request.header(HASH_SHA256, signature.as_str());
            }

            let response = request.send().await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(DispatchError::NonSuccessStatus {
                    status: response.status().as_u16(),
                })
            }
        }
    };

    let result = tokio::time::timeout(
        SINGLE_DISPATCH_DEADLINE,
        with_retry(&deps.retry_policy, classify_dispatch_error, attempt),
    )
    .await;

    match result {
        Ok(inner) => inner,
        Err(_) => Err(DispatchError::DeadlineExceeded),
    }
}

#[cfg(test)]
#[path = "single_tests.rs"]
mod tests;
