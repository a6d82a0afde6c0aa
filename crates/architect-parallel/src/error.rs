use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParallelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git worktree command failed: {0}")]
    GitFailed(String),

    #[error("no models configured and no default model given")]
    NoModel,
}

pub type ParallelResult<T> = Result<T, ParallelError>;
