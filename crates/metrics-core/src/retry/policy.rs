//! Fixed-interval retry schedule.

use std::time::Duration;

/// `{max_attempts, intervals}`. Attempt *k* (k >= 2) waits
/// `intervals[min(k-2, len-1)]` before executing — the last configured
/// interval repeats for any attempt beyond the schedule's length.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub intervals: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, intervals: Vec<Duration>) -> Self {
        Self {
            max_attempts,
            intervals,
        }
    }

    /// Default preset: 4 attempts, 1s/3s/5s between them.
    pub fn default_policy() -> Self {
        Self::new(
            4,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(3),
                Duration::from_secs(5),
            ],
        )
    }

    /// Fast preset for tests and low-latency environments: 3 attempts,
    /// 10ms/20ms between them.
    pub fn fast() -> Self {
        Self::new(3, vec![Duration::from_millis(10), Duration::from_millis(20)])
    }

    /// No retry: a single attempt, no schedule.
    pub fn no_retry() -> Self {
        Self::new(1, Vec::new())
    }

    /// Delay to wait before attempt `k` (1-based, where 1 is the initial
    /// attempt and needs no delay).
    fn delay_for_attempt(&self, k: u32) -> Duration {
        if k < 2 || self.intervals.is_empty() {
            return Duration::ZERO;
        }
        let idx = ((k - 2) as usize).min(self.intervals.len() - 1);
        self.intervals[idx]
    }

    fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}

/// Tracks which attempt a retry loop is on.
///
/// A thin counter plus helper methods, kept separate from [`RetryPolicy`]
/// so the same state type can drive any policy.
#[derive(Debug, Clone, Default)]
pub struct RetryState {
    /// Attempts made so far, including the first (1-based once started).
    pub attempts_made: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self { attempts_made: 0 }
    }

    pub fn record_attempt(&mut self) {
        self.attempts_made += 1;
    }

    pub fn can_retry(&self, policy: &RetryPolicy) -> bool {
        policy.should_retry(self.attempts_made)
    }

    /// Delay before the *next* attempt (i.e. attempt `attempts_made + 1`).
    pub fn next_delay(&self, policy: &RetryPolicy) -> Duration {
        policy.delay_for_attempt(self.attempts_made + 1)
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
