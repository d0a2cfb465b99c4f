//! Error types for ctp-risk.
//!
//! A veto from a pre-check is not represented here: vetoes are expected
//! outcomes, logged and returned as `Ok(None)` by the gate.

use thiserror::Error;

/// Risk layer errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RiskError {
    /// The requested risk category is not recognized. Raised before any
    /// hook or action runs.
    #[error("unrecognized risk category {0:?}, expected \"market\" or \"trader\"")]
    InvalidCategory(String),

    /// The target lacks the capability the category requires.
    #[error("{0}")]
    MissingCapability(String),

    /// The gate has no post-check; post-action bookkeeping would be
    /// silently skipped, so this fails fast. Note the wrapped action has
    /// already executed by the time this surfaces.
    #[error("risk gate {0:?} has no post-check configured")]
    MissingPostCheck(String),

    /// The shared risk context was attached a second time. The bus
    /// reference is write-once; reattachment is a programming error.
    #[error("risk context already attached")]
    AlreadyAttached,
}

/// Result type alias for risk operations.
pub type RiskResult<T> = std::result::Result<T, RiskError>;
