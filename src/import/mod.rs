//! Listing import subsystem.
//!
//! # Data Flow
//! ```text
//! listings (JSON feed)
//!     → listing.rs (parse, validate)
//!     → batch.rs (one RetryScheduler run per listing, in order)
//!     → sink.rs (idempotent save of one listing)
//!     → summary.rs (ImportSummary returned to the caller)
//! ```

pub mod batch;
pub mod listing;
pub mod sink;
pub mod summary;

pub use batch::{BatchImporter, BatchItem};
pub use listing::{load_listings, parse_listings, Listing};
pub use sink::{FileSink, ListingSink};
pub use summary::{ImportError, ImportSummary};
