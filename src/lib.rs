//! Resilient MLS listing import.
//!
//! A retry scheduler with exponential backoff and jitter, a batch importer
//! that summarizes per-listing outcomes, and the small pieces around them:
//! failure classification and chunked session storage.

pub mod config;
pub mod errors;
pub mod import;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::ImportConfig;
pub use errors::ServiceError;
pub use import::{BatchImporter, BatchItem, ImportSummary, Listing};
pub use resilience::{BackoffPolicy, RetryOutcome, RetryScheduler};
