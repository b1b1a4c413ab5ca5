//! HTTP dispatch: a shared `reqwest::Client`, the single-metric and batch
//! senders, and the bounded worker pool that runs the
//! single-metric path concurrently.

mod batch;
mod client;
mod pool;
mod single;

pub use batch::send_batch;
pub use client::{build_http_client, outbound_interface_ip, DispatchDeps};
pub use pool::{PoolHandle, WorkerJob, WorkerPool};
pub use single::send_metric;

use metrics_core::retry::ErrorClass;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to JSON-encode metric payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to gzip-compress payload: {0}")]
    Compress(#[from] metrics_core::crypto::gzip::GzipError),

    #[error("failed to RSA-OAEP encrypt payload: {0}")]
    Encrypt(#[from] metrics_core::crypto::cipher::CipherError),

    #[error("failed to sign payload: {0}")]
    Sign(#[from] metrics_core::crypto::hash::HmacError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("server responded with non-success status {status}")]
    NonSuccessStatus { status: u16 },

    #[error("dispatch did not complete within the request-context deadline")]
    DeadlineExceeded,
}

/// Classify a dispatch failure per : network errors are
/// retriable, a non-2xx response is retriable, and
/// everything else (bad key material, encode failure) is terminal —
/// retrying would reproduce the same error.
pub fn classify_dispatch_error(err: &DispatchError) -> ErrorClass {
    match err {
        DispatchError::Transport(e) => metrics_core::retry::classify_reqwest(e),
        DispatchError::NonSuccessStatus { .. } => ErrorClass::Retriable,
        _ => ErrorClass::Terminal,
    }
}
