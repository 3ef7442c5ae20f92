//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every problem is
//! reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ImportConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("session.chunk_size must be at least 1")]
    ZeroChunkSize,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    BadMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ImportConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    if config.session.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ImportConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ImportConfig::default();
        config.retries.max_attempts = 0;
        config.session.chunk_size = 0;
        config.observability.log_level = "loud".into();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroAttempts,
                ValidationError::ZeroChunkSize,
                ValidationError::UnknownLogLevel("loud".into()),
                ValidationError::BadMetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = ImportConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());
    }
}
