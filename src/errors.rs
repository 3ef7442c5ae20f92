//! Failure classification.
//!
//! Failures from storage, identity and model backends arrive as a tagged
//! [`ServiceError`] rather than as free-form strings, so the importer can
//! decide what is worth retrying and what to tell the user by matching on
//! the variant.

use std::io;

use thiserror::Error;

/// Classified failure of a unit of work.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request throttled")]
    Throttled,

    #[error("resource not found")]
    NotFound,

    #[error("access denied")]
    AccessDenied,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conditional write conflict")]
    Conflict,

    #[error("service unavailable")]
    Unavailable,

    #[error("network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Throttled | ServiceError::Unavailable | ServiceError::Network(_) => true,
            ServiceError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Throttled => {
                "Too many requests right now. Please wait a moment and try again.".to_string()
            }
            ServiceError::NotFound => "The requested item could not be found.".to_string(),
            ServiceError::AccessDenied => {
                "You do not have permission to perform this action.".to_string()
            }
            ServiceError::Validation(detail) => format!("Please check your input: {}", detail),
            ServiceError::Conflict => {
                "This item was changed by someone else. Refresh and try again.".to_string()
            }
            ServiceError::Unavailable | ServiceError::Network(_) => {
                "The service is temporarily unavailable. Please try again later.".to_string()
            }
            ServiceError::Io(_) | ServiceError::Serialization(_) | ServiceError::Other(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}

impl From<io::Error> for ServiceError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => ServiceError::NotFound,
            io::ErrorKind::PermissionDenied => ServiceError::AccessDenied,
            _ => ServiceError::Io(e),
        }
    }
}
