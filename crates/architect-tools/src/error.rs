//! Argument validation error type — the only place a tool is allowed to
//! fail before producing a [`architect_core::ToolResult`].

use serde_json::Value;
use thiserror::Error;

/// Raised by [`crate::BuiltinTool::validate_args`] when raw arguments don't
/// match the tool's schema. The Execution Engine turns this into a
/// `ToolResult(error: INVALID_ARGS)` — it is never propagated further.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A required field is missing or has the wrong type.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The schema rejects an unrecognized field (structural validation).
    #[error("invalid arguments: unknown field '{0}'")]
    UnknownField(String),
}

/// Arguments that have passed [`crate::BuiltinTool::validate_args`].
pub type ValidatedArgs = Value;
