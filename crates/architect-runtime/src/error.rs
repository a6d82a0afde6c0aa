//! Errors surfaced by session persistence and the Agent Loop itself. Tool
//! and LLM failures never appear here — those are folded into
//! [`architect_core::AgentState`] as terminal status, not raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("run aborted by execution engine: {0}")]
    Aborted(#[from] architect_exec::ExecError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
