//! Guardrail-local error type.

use thiserror::Error;

/// Errors raised by guardrail checks themselves (not the decisions they
/// produce — those are [`crate::GuardrailDecision`] values, not errors).
#[derive(Debug, Error)]
pub enum GuardrailError {
    /// A glob or regex pattern in the configuration failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result alias for guardrail configuration/compilation steps.
pub type GuardrailResult<T> = Result<T, GuardrailError>;
