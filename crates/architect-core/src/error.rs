//! Shared error type for the data-model layer. Most crates define their own
//! `thiserror` enum; this one exists for the few operations `architect-core`
//! itself performs (validation of config values passed in from callers).

use thiserror::Error;

/// Errors raised by `architect-core`'s own validation helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A config field failed validation.
    #[error("invalid agent config: {0}")]
    InvalidConfig(String),
}

/// Result alias for `architect-core` operations.
pub type CoreResult<T> = Result<T, CoreError>;
