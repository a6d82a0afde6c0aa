use thiserror::Error;

#[derive(Debug, Error)]
pub enum RalphError {
    #[error("agent loop error: {0}")]
    Runtime(#[from] architect_runtime::RuntimeError),

    #[error("invalid completion tag pattern: {0}")]
    InvalidCompletionTag(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RalphResult<T> = Result<T, RalphError>;
