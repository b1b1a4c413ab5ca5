//! The retry executor itself: run an action, classify failures, sleep the
//! configured schedule, retry until exhausted or the error is terminal
//!.

use super::{ErrorClass, RetryPolicy, RetryState};
use std::future::Future;

/// Run `action` under `policy`, reclassifying each failure with `classify`.
///
/// Non-retriable errors terminate immediately with the original error
/// (property P9: "for non-retriable errors, exactly once"). Retriable
/// failures sleep the policy's schedule and retry until `max_attempts` is
/// reached, at which point the last error is returned.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    classify: impl Fn(&E) -> ErrorClass,
    mut action: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut state = RetryState::new();

    loop {
        state.record_attempt();
        match action().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if classify(&err) == ErrorClass::Terminal {
                    return Err(err);
                }
                if !state.can_retry(policy) {
                    return Err(err);
                }
                let delay = state.next_delay(policy);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
