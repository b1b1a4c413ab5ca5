//! Error classification for the retry executor.
//!
//! Transient failures are retried; everything else terminates the retry
//! loop immediately with the original error.

/// Whether a failure should be retried or surfaced immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retriable,
    Terminal,
}

/// Classify a `reqwest` dispatch failure.
pub fn classify_reqwest(err: &reqwest::Error) -> ErrorClass {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        return ErrorClass::Retriable;
    }
    // Non-2xx responses are surfaced by the caller as a distinct error type
    // and are
    // classified at the call site, not here, since `reqwest::Error` alone
    // cannot distinguish a successful transport from a bad status.
    ErrorClass::Terminal
}

/// Classify a standard library I/O error.
pub fn classify_io(err: &std::io::Error) -> ErrorClass {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::WouldBlock
        | ErrorKind::Interrupted
        | ErrorKind::TimedOut
        | ErrorKind::PermissionDenied => ErrorClass::Retriable,
        _ => ErrorClass::Terminal,
    }
}

/// Classify a `sqlx` error.
#[cfg(feature = "relational")]
pub fn classify_sqlx(err: &sqlx::Error) -> ErrorClass {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            ErrorClass::Retriable
        }
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) if code.starts_with("08") => ErrorClass::Retriable,
            _ => ErrorClass::Terminal,
        },
        _ => ErrorClass::Terminal,
    }
}

/// An explicit non-2xx HTTP response from a peer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("server responded with non-success status {status}")]
pub struct NonSuccessStatus {
    pub status: u16,
}

pub fn classify_status(_status: &NonSuccessStatus) -> ErrorClass {
    ErrorClass::Retriable
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
