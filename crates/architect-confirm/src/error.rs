//! Confirmation Policy error type.

use thiserror::Error;

/// Raised when a prompt is required but standard input is not a terminal.
#[derive(Debug, Error)]
pub enum ConfirmError {
    /// Stdin is not a TTY and a prompt was required. The operator should
    /// rerun with `yolo` confirmation mode or `--dry-run`.
    #[error("confirmation required but stdin is not a terminal; rerun with yolo mode or --dry-run")]
    NoTty,
}

pub type ConfirmResult<T> = Result<T, ConfirmError>;
