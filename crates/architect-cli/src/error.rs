//! CLI-local error type. Commands surface `anyhow::Error` at the top level,
//! but the builder and config-loading paths need a typed variant to pick
//! the right exit code before anything reaches `anyhow`.

use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Runtime(#[from] architect_runtime::RuntimeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Exit code to use when this error aborts a command before a run ever
    /// starts (config/auth problems have no `AgentState` to classify).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => crate::exit_code::CONFIG_ERROR,
            CliError::Runtime(_) | CliError::Io(_) => crate::exit_code::FAILED,
        }
    }
}
