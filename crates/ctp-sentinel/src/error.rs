//! Error types for the application crate.

use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("host error: {0}")]
    Host(#[from] ctp_host::HostError),

    #[error("risk error: {0}")]
    Risk(#[from] ctp_risk::RiskError),

    #[error("telemetry error: {0}")]
    Telemetry(#[from] ctp_telemetry::TelemetryError),
}

/// Result type alias for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
