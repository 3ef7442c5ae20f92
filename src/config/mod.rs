//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ImportConfig (validated, immutable)
//! ```
//!
//! Every field has a default, so an empty file (or no file) is a valid config.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ImportConfig, LogFormat, ObservabilityConfig, RetryConfig, SessionConfig};
pub use validation::ValidationError;
