//! Exponential backoff with jitter.
//!
//! The delay that follows the failed attempt with 0-indexed number `k` is
//! `base_ms * 2^k + random(0, jitter_ms)`.

use std::fmt;
use std::time::Duration;
use rand::Rng;

use crate::config::RetryConfig;

/// Backoff policy for retried operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Base delay in milliseconds.
    pub base_ms: u64,
    /// Upper bound (exclusive) of the random jitter in milliseconds.
    pub jitter_ms: u64,
}

impl BackoffPolicy {
    pub fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    /// Deterministic part of the delay for the given attempt index.
    pub fn exponential_ms(&self, attempt: u32) -> u64 {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        self.base_ms.saturating_mul(factor)
    }

    /// Half-open window `[min, max)` the delay for `attempt` falls into.
    ///
    /// With no jitter the window collapses to a single value and `max == min`.
    pub fn window_ms(&self, attempt: u32) -> (u64, u64) {
        let min = self.exponential_ms(attempt);
        (min, min.saturating_add(self.jitter_ms))
    }

    /// Delay to wait after the failed attempt with 0-indexed number `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(calculate_backoff(attempt, self.base_ms, self.jitter_ms))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(1_000, 1_000)
    }
}

impl From<&RetryConfig> for BackoffPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.base_delay_ms, config.jitter_ms)
    }
}

/// Delay window before one retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryWindow {
    /// 1-based retry number (the attempt that follows is `retry + 1`).
    pub retry: u32,
    pub min_ms: u64,
    /// Exclusive upper bound; equals `min_ms` without jitter.
    pub max_ms: u64,
}

impl fmt::Display for RetryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "retry {}: [{} ms, {} ms)", self.retry, self.min_ms, self.max_ms)
    }
}

impl BackoffPolicy {
    /// Delay windows slept by a run of `max_attempts` that keeps failing.
    ///
    /// Delays only happen between attempts, so there are `max_attempts - 1`.
    pub fn schedule(&self, max_attempts: u32) -> Vec<RetryWindow> {
        (0..max_attempts.saturating_sub(1))
            .map(|attempt| {
                let (min_ms, max_ms) = self.window_ms(attempt);
                RetryWindow { retry: attempt + 1, min_ms, max_ms }
            })
            .collect()
    }
}

/// Calculate exponential backoff delay with jitter, in milliseconds.
pub fn calculate_backoff(attempt: u32, base_ms: u64, jitter_ms: u64) -> u64 {
    let exponential = BackoffPolicy::new(base_ms, jitter_ms).exponential_ms(attempt);

    let jitter = if jitter_ms > 0 {
        rand::thread_rng().gen_range(0..jitter_ms)
    } else {
        0
    };

    exponential.saturating_add(jitter)
}
