//! The batch encoder/sender: stateless, given the metrics and
//! the same dispatch dependencies the single-metric path uses, POSTs the
//! whole sequence to `/updates/` under a 30-second deadline.

use super::client::DispatchDeps;
use super::{classify_dispatch_error, DispatchError};
use metrics_core::crypto::{cipher, gzip, hash};
use metrics_core::retry::with_retry;
use metrics_core::wire::headers::{
    ACCEPT_ENCODING, CONTENT_ENCODING, HASH_SHA256, X_ENCRYPTED, X_REAL_IP,
};
use metrics_core::wire::Metric;
use std::time::Duration;

const BATCH_DISPATCH_DEADLINE: Duration = Duration::from_secs(30);

/// Encode and send `metrics` as a single JSON array to `/updates/`. An
/// empty slice is a no-op success — the aggregator
/// never has to special-case "nothing to report".
pub async fn send_batch(deps: &DispatchDeps, metrics: &[Metric]) -> Result<(), DispatchError> {
    if metrics.is_empty() {
        return Ok(());
    }

    let body = serde_json::to_vec(metrics)?;
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

    let url = format!("{}/updates/", deps.server_address.trim_end_matches('/'));

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
        BATCH_DISPATCH_DEADLINE,
        with_retry(&deps.retry_policy, classify_dispatch_error, attempt),
    )
    .await;

    match result {
        Ok(inner) => inner,
        Err(_) => Err(DispatchError::DeadlineExceeded),
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
