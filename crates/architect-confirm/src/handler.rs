//! The confirmation prompt itself: a trait so the Agent Loop isn't tied to
//! a terminal (tests and non-interactive frontends substitute their own).

use std::io::IsTerminal;

use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use crate::error::{ConfirmError, ConfirmResult};
use crate::request::{ConfirmDecision, ConfirmRequest};

/// Presents a [`ConfirmRequest`] to the operator and returns their decision.
#[async_trait::async_trait]
pub trait ConfirmHandler: Send + Sync {
    /// Ask for a decision. Returns [`ConfirmError::NoTty`] if a prompt
    /// cannot be shown (§4.3's "fail fast" requirement).
    async fn confirm(&self, request: &ConfirmRequest) -> ConfirmResult<ConfirmDecision>;
}

/// Terminal-backed handler: `y`/`n`/`a` via `dialoguer`.
pub struct CliConfirmHandler;

impl CliConfirmHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether stdin is a terminal a prompt could actually be shown on.
    #[must_use]
    pub fn stdin_is_tty() -> bool {
        std::io::stdin().is_terminal()
    }
}

impl Default for CliConfirmHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfirmHandler for CliConfirmHandler {
    async fn confirm(&self, request: &ConfirmRequest) -> ConfirmResult<ConfirmDecision> {
        if !Self::stdin_is_tty() {
            return Err(ConfirmError::NoTty);
        }

        println!();
        println!("{}", "--- Confirmation Required ---".yellow().bold());
        println!("  {} {}", "Tool:".bold(), request.tool_name);
        println!("  {} {}", "Args:".bold(), request.args_summary);
        println!("  {} {}", "Reason:".bold(), request.reason);
        println!("{}", "------------------------------".yellow().bold());

        let options = &["Accept (y)", "Reject (n)", "Abort run (a)"];
        let request = request.clone();

        let selection = tokio::task::spawn_blocking(move || {
            let _ = &request;
            Select::with_theme(&ColorfulTheme::default())
                .items(options)
                .default(0)
                .interact()
        })
        .await
        .map_err(|_| ConfirmError::NoTty)?
        .map_err(|_| ConfirmError::NoTty)?;

        Ok(match selection {
            0 => ConfirmDecision::Accept,
            1 => ConfirmDecision::Reject,
            _ => ConfirmDecision::Abort,
        })
    }
}

/// Always accepts. Used in `yolo` mode and tests where no prompt should
/// ever actually fire (the policy layer shouldn't call this in practice,
/// but it keeps test harnesses simple).
pub struct AutoAcceptHandler;

#[async_trait::async_trait]
impl ConfirmHandler for AutoAcceptHandler {
    async fn confirm(&self, _request: &ConfirmRequest) -> ConfirmResult<ConfirmDecision> {
        Ok(ConfirmDecision::Accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn auto_accept_always_accepts() {
        let handler = AutoAcceptHandler;
        let request = ConfirmRequest::new("write_file", "{}", "sensitive tool");
        assert_eq!(handler.confirm(&request).await.unwrap(), ConfirmDecision::Accept);
    }
}
