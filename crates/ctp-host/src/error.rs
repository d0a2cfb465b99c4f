//! Error types for ctp-host.

use thiserror::Error;

/// Host boundary errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("unknown extension: {0}")]
    UnknownExtension(String),

    #[error("invalid extension registration payload: {0}")]
    InvalidRegistration(String),
}

/// Result type alias for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;
