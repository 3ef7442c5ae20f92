//! Retry scheduler.
//!
//! # Responsibilities
//! - Run a caller-supplied unit of work up to `max_attempts` times
//! - Sleep with exponential backoff + jitter between attempts
//! - Report the first success or the last failure as a value
//!
//! # State Transitions
//! ```text
//! Pending → Succeeded: attempt succeeds
//! Pending → Pending:   attempt fails, attempts remain (sleep, then retry)
//! Pending → Failed:    attempt fails, attempts exhausted (no sleep)
//! ```

use std::fmt::Display;
use std::future::Future;

use serde::Serialize;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;

/// Lifecycle state of a [`RetryableOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryState {
    Pending,
    Succeeded,
    Failed,
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub success: bool,
    pub error: Option<String>,
    /// 1-based attempt number.
    pub attempt: u32,
}

/// Per-item retry bookkeeping.
#[derive(Debug, Clone)]
pub struct RetryableOperation {
    id: String,
    max_attempts: u32,
    attempts: u32,
    state: RetryState,
    history: Vec<AttemptResult>,
}

impl RetryableOperation {
    /// Create a pending operation. `max_attempts` of 0 is treated as 1.
    pub fn new(id: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            id: id.into(),
            max_attempts: max_attempts.max(1),
            attempts: 0,
            state: RetryState::Pending,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn history(&self) -> &[AttemptResult] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.state != RetryState::Pending
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }

    /// Record a successful attempt. Ignored once the operation is terminal.
    pub fn record_success(&mut self) -> RetryState {
        if self.is_terminal() {
            return self.state;
        }
        self.attempts += 1;
        self.history.push(AttemptResult {
            success: true,
            error: None,
            attempt: self.attempts,
        });
        self.state = RetryState::Succeeded;
        self.state
    }

    /// Record a failed attempt and return the resulting state.
    /// Ignored once the operation is terminal.
    pub fn record_failure(&mut self, error: impl Into<String>) -> RetryState {
        if self.is_terminal() {
            return self.state;
        }
        self.attempts += 1;
        self.history.push(AttemptResult {
            success: false,
            error: Some(error.into()),
            attempt: self.attempts,
        });
        if self.attempts >= self.max_attempts {
            self.state = RetryState::Failed;
        }
        self.state
    }
}

/// Terminal result of a scheduled operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Ok(value),
            RetryOutcome::Exhausted { error, .. } => Err(error),
        }
    }
}

/// Executes units of work with bounded retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryScheduler {
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl RetryScheduler {
    /// Create a scheduler. `max_attempts` of 0 is treated as 1.
    pub fn new(max_attempts: u32, backoff: BackoffPolicy) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, BackoffPolicy::from(config))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Run `work` for the operation identified by `id`.
    pub async fn run<F, Fut, T, E>(&self, id: &str, work: F) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut operation = RetryableOperation::new(id, self.max_attempts);
        self.drive(&mut operation, work).await
    }

    /// Drive `operation` to a terminal state using `work`.
    ///
    /// The operation's own `max_attempts` bounds the run; attempts already
    /// recorded on it count against that budget. Returns `None` without
    /// invoking `work` when the operation is already terminal.
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation: &mut RetryableOperation,
        work: F,
    ) -> Option<RetryOutcome<T, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if operation.is_terminal() {
            tracing::debug!(
                id = %operation.id(),
                state = ?operation.state(),
                attempts = operation.attempts(),
                "Operation already terminal, not running"
            );
            return None;
        }
        Some(self.drive(operation, work).await)
    }

    /// Attempt loop. `operation` must be pending.
    async fn drive<F, Fut, T, E>(
        &self,
        operation: &mut RetryableOperation,
        mut work: F,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        loop {
            // 0-indexed number of the attempt about to run
            let attempt = operation.attempts();

            match work().await {
                Ok(value) => {
                    operation.record_success();
                    metrics::record_attempt("success");
                    if attempt > 0 {
                        tracing::info!(
                            id = %operation.id(),
                            attempts = operation.attempts(),
                            "Operation succeeded after retry"
                        );
                    }
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: operation.attempts(),
                    };
                }
                Err(error) => {
                    let message = error.to_string();
                    metrics::record_attempt("failure");
                    tracing::warn!(
                        id = %operation.id(),
                        attempt = attempt + 1,
                        max_attempts = operation.max_attempts(),
                        error = %message,
                        "Attempt failed"
                    );

                    if operation.record_failure(message) == RetryState::Failed {
                        tracing::error!(
                            id = %operation.id(),
                            attempts = operation.attempts(),
                            error = %error,
                            "Retries exhausted"
                        );
                        return RetryOutcome::Exhausted {
                            error,
                            attempts: operation.attempts(),
                        };
                    }

                    let delay = self.backoff.delay(attempt);
                    metrics::record_retry_delay(delay);
                    tracing::info!(
                        id = %operation.id(),
                        attempt = attempt + 1,
                        delay = ?delay,
                        "Retrying operation"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryScheduler {
    fn default() -> Self {
        Self::new(3, BackoffPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_invokes_once() {
        let calls = Cell::new(0u32);
        let scheduler = RetryScheduler::default();

        let outcome = scheduler
            .run("MLS-1", || {
                calls.set(calls.get() + 1);
                async { Ok::<_, String>("imported") }
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_exhausts_attempts() {
        let calls = Cell::new(0u32);
        let scheduler = RetryScheduler::default();

        let outcome = scheduler
            .run("MLS-2", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Err::<(), _>(format!("boom {}", n)) }
            })
            .await;

        assert_eq!(calls.get(), 3);
        match outcome {
            RetryOutcome::Exhausted { error, attempts } => {
                assert_eq!(attempts, 3);
                assert_eq!(error, "boom 3");
            }
            RetryOutcome::Succeeded { .. } => panic!("expected exhaustion"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let calls = Cell::new(0u32);
        let scheduler = RetryScheduler::default();
        let start = Instant::now();

        let outcome = scheduler
            .run("MLS-3", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err("throttled")
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        let elapsed = start.elapsed();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 3);
        // delay(0) + delay(1) ∈ [3000, 5000)
        assert!(elapsed >= Duration::from_millis(3000), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(5000), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_final_failure() {
        let scheduler = RetryScheduler::new(1, BackoffPolicy::new(1000, 0));
        let start = Instant::now();

        let outcome = scheduler.run("MLS-4", || async { Err::<(), _>("down") }).await;

        assert_eq!(outcome.attempts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_records_history() {
        let scheduler = RetryScheduler::new(3, BackoffPolicy::new(10, 0));
        let mut op = RetryableOperation::new("MLS-5", 3);
        let calls = Cell::new(0u32);

        let outcome = scheduler
            .execute(&mut op, || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { if n == 1 { Err("timeout") } else { Ok(()) } }
            })
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(op.state(), RetryState::Succeeded);
        assert_eq!(op.history().len(), 2);
        assert_eq!(op.history()[0].error.as_deref(), Some("timeout"));
        assert!(op.history()[1].success);
        assert_eq!(op.history()[1].attempt, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_on_terminal_operation_does_not_rerun() {
        let scheduler = RetryScheduler::new(3, BackoffPolicy::new(10, 0));
        let mut op = RetryableOperation::new("MLS-7", 3);
        let calls = Cell::new(0u32);
        let work = || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>("unavailable") }
        };

        let first = scheduler.execute(&mut op, work).await.unwrap();
        assert_eq!(first.attempts(), 3);
        assert_eq!(op.state(), RetryState::Failed);

        let second = scheduler.execute(&mut op, work).await;
        assert!(second.is_none());
        assert_eq!(calls.get(), 3);
        assert_eq!(op.attempts(), 3);
        assert_eq!(op.history().len(), 3);
    }

    #[test]
    fn test_record_on_terminal_operation_is_ignored() {
        let mut op = RetryableOperation::new("MLS-8", 1);
        assert_eq!(op.record_success(), RetryState::Succeeded);
        assert_eq!(op.record_failure("late"), RetryState::Succeeded);
        assert_eq!(op.record_success(), RetryState::Succeeded);
        assert_eq!(op.attempts(), 1);
        assert_eq!(op.history().len(), 1);
    }

    #[test]
    fn test_operation_state_machine() {
        let mut op = RetryableOperation::new("MLS-6", 2);
        assert_eq!(op.state(), RetryState::Pending);
        assert_eq!(op.remaining(), 2);

        assert_eq!(op.record_failure("a"), RetryState::Pending);
        assert_eq!(op.remaining(), 1);
        assert_eq!(op.record_failure("b"), RetryState::Failed);
        assert!(op.is_terminal());
        assert_eq!(op.attempts(), 2);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryScheduler::new(0, BackoffPolicy::default()).max_attempts(), 1);
        assert_eq!(RetryableOperation::new("x", 0).max_attempts(), 1);
    }
}
