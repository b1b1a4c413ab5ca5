//! # Retry Executor
//!
//! A classified-retry executor with a bounded, fixed-interval schedule,
//! shared by the agent's dispatcher and the server's persistence layer.
//!
//! Errors are classified as retriable or terminal before the schedule is
//! ever consulted, and each retriable attempt waits for the next entry in
//! a fixed interval list rather than an exponential backoff curve. The
//! attempt-tracking shape (a small `RetryState` companion struct) stays
//! independent of how the delay for that attempt is computed, since
//! tracking "which attempt am I on" is orthogonal to the schedule itself.

mod classify;
mod executor;
mod policy;

pub use classify::{classify_io, classify_reqwest, classify_status, ErrorClass, NonSuccessStatus};
#[cfg(feature = "relational")]
pub use classify::classify_sqlx;
pub use executor::with_retry;
pub use policy::{RetryPolicy, RetryState};
