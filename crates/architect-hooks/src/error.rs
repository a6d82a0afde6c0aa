//! Hook configuration error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("invalid matcher regex '{pattern}': {reason}")]
    InvalidMatcher { pattern: String, reason: String },
}

pub type HookResult<T> = Result<T, HookError>;
