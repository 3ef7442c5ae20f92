//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Unit of work (e.g. import one listing):
//!     → retries.rs (run, classify outcome, track attempts)
//!     → On failure with attempts left: backoff.rs (base * 2^k + jitter), sleep, retry
//!     → RetryOutcome (Succeeded or Exhausted) back to the caller
//! ```

pub mod backoff;
pub mod retries;

pub use backoff::{BackoffPolicy, RetryWindow};
pub use retries::{AttemptResult, RetryOutcome, RetryScheduler, RetryState, RetryableOperation};
