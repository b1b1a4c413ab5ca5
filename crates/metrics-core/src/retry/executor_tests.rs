use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, PartialEq)]
struct Transient;
#[derive(Debug, PartialEq)]
struct Fatal;

fn classify_transient(_: &Transient) -> ErrorClass {
    ErrorClass::Retriable
}

fn classify_fatal(_: &Fatal) -> ErrorClass {
    ErrorClass::Terminal
}

#[tokio::test]
async fn succeeds_immediately_without_retrying() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::fast();
    let result: Result<u32, Transient> = with_retry(&policy, classify_transient, || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(7)
    })
    .await;

    assert_eq!(result, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn terminal_error_is_not_retried() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::fast();
    let result: Result<u32, Fatal> = with_retry(&policy, classify_fatal, || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(Fatal)
    })
    .await;

    assert_eq!(result, Err(Fatal));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retriable_error_retries_up_to_max_attempts() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::fast();
    let result: Result<u32, Transient> = with_retry(&policy, classify_transient, || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(Transient)
    })
    .await;

    assert_eq!(result, Err(Transient));
    assert_eq!(calls.load(Ordering::SeqCst), policy.max_attempts);
}

#[tokio::test]
async fn succeeds_after_transient_failures_within_budget() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::fast();
    let result: Result<u32, Transient> = with_retry(&policy, classify_transient, || async {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            Err(Transient)
        } else {
            Ok(99)
        }
    })
    .await;

    assert_eq!(result, Ok(99));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
