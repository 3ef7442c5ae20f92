//! Session value storage.
//!
//! # Data Flow
//! ```text
//! auth tokens (possibly larger than one cookie)
//!     → chunked.rs (split into chunks + manifest)
//!     → store.rs (ScopedStore: cookie jar, in-memory map, ...)
//! ```

pub mod chunked;
pub mod store;

pub use chunked::{ChunkedCodec, SessionError};
pub use store::{MemoryStore, ScopedStore};
