//! Errors raised while validating paths against workspace boundaries.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::validate_path`] and [`crate::WorkspaceBoundary`].
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The resolved path escapes the workspace root.
    #[error("path traversal: {path} resolves outside workspace root {root}")]
    PathTraversal {
        /// The offending path, as given.
        path: PathBuf,
        /// The workspace root it was checked against.
        root: PathBuf,
    },
    /// A deletion was requested but `allow_delete` is not set on the
    /// workspace config.
    #[error("deletion of {path} rejected: allow_delete is not set")]
    DeleteNotAllowed {
        /// The path the caller tried to delete.
        path: PathBuf,
    },
}

/// Result alias for workspace validation operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
