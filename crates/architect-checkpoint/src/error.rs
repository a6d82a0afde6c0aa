use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    #[error("git command failed: {0}")]
    GitFailed(String),

    #[error("no checkpoint matches {0:?}")]
    NotFound(String),

    #[error("unparsable git log entry: {0:?}")]
    UnparsableLogEntry(String),
}

pub type CheckpointResult<T> = Result<T, CheckpointError>;
