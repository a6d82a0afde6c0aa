//! Errors raised while building or caching a [`crate::RepoIndex`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("workspace root not found: {0}")]
    RootNotFound(std::path::PathBuf),

    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type IndexResult<T> = Result<T, IndexError>;
