//! The Execution Engine's only true raise: an aborted confirmation prompt
//! terminates the Agent Loop with `USER_INTERRUPT`. Every other failure
//! mode is reported through a [`architect_core::ToolResult`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("user aborted the run at a confirmation prompt")]
    UserInterrupt,
}

pub type ExecResult<T> = Result<T, ExecError>;
