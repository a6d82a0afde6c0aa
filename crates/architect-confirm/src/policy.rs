//! The confirmation matrix: which tool calls need a prompt, given the
//! active [`architect_core::ConfirmMode`] and (for `run_command`) the
//! dynamic command classification.

use architect_core::ConfirmMode;
use architect_tools::CommandClass;

/// What a policy check decided, before any actual prompting happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Proceed without prompting.
    AutoAllow,
    /// Prompt the operator before proceeding.
    RequiresPrompt,
    /// Refuse unconditionally; no prompt offered.
    RejectOutright,
}

/// The Confirmation Policy.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmPolicy {
    pub mode: ConfirmMode,
    /// Strict-whitelist mode: `dangerous` `run_command` invocations are
    /// rejected outright regardless of confirmation mode.
    pub allowed_only: bool,
}

impl ConfirmPolicy {
    #[must_use]
    pub fn new(mode: ConfirmMode) -> Self {
        Self { mode, allowed_only: false }
    }

    #[must_use]
    pub fn with_allowed_only(mut self, allowed_only: bool) -> Self {
        self.allowed_only = allowed_only;
        self
    }

    /// Decide for an ordinary (non-`run_command`) tool call.
    #[must_use]
    pub fn for_tool(&self, sensitive: bool) -> ConfirmOutcome {
        match self.mode {
            ConfirmMode::Yolo => ConfirmOutcome::AutoAllow,
            ConfirmMode::ConfirmSensitive => {
                if sensitive {
                    ConfirmOutcome::RequiresPrompt
                } else {
                    ConfirmOutcome::AutoAllow
                }
            }
            ConfirmMode::ConfirmAll => ConfirmOutcome::RequiresPrompt,
        }
    }

    /// Decide for a `run_command` invocation, given its dynamic
    /// classification (§4.10).
    #[must_use]
    pub fn for_command(&self, class: CommandClass) -> ConfirmOutcome {
        if self.allowed_only && matches!(class, CommandClass::Dangerous) {
            return ConfirmOutcome::RejectOutright;
        }

        match (self.mode, class) {
            (ConfirmMode::Yolo, _) => ConfirmOutcome::AutoAllow,
            (ConfirmMode::ConfirmSensitive, CommandClass::Safe) => ConfirmOutcome::AutoAllow,
            (ConfirmMode::ConfirmSensitive, CommandClass::Dev | CommandClass::Dangerous) => {
                ConfirmOutcome::RequiresPrompt
            }
            (ConfirmMode::ConfirmAll, _) => ConfirmOutcome::RequiresPrompt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yolo_never_prompts_for_tools() {
        let policy = ConfirmPolicy::new(ConfirmMode::Yolo);
        assert_eq!(policy.for_tool(true), ConfirmOutcome::AutoAllow);
        assert_eq!(policy.for_tool(false), ConfirmOutcome::AutoAllow);
    }

    #[test]
    fn confirm_sensitive_prompts_only_sensitive_tools() {
        let policy = ConfirmPolicy::new(ConfirmMode::ConfirmSensitive);
        assert_eq!(policy.for_tool(true), ConfirmOutcome::RequiresPrompt);
        assert_eq!(policy.for_tool(false), ConfirmOutcome::AutoAllow);
    }

    #[test]
    fn confirm_all_always_prompts() {
        let policy = ConfirmPolicy::new(ConfirmMode::ConfirmAll);
        assert_eq!(policy.for_tool(true), ConfirmOutcome::RequiresPrompt);
        assert_eq!(policy.for_tool(false), ConfirmOutcome::RequiresPrompt);
    }

    #[test]
    fn command_matrix_matches_spec_table() {
        let yolo = ConfirmPolicy::new(ConfirmMode::Yolo);
        assert_eq!(yolo.for_command(CommandClass::Safe), ConfirmOutcome::AutoAllow);
        assert_eq!(yolo.for_command(CommandClass::Dev), ConfirmOutcome::AutoAllow);
        assert_eq!(yolo.for_command(CommandClass::Dangerous), ConfirmOutcome::AutoAllow);

        let confirm_sensitive = ConfirmPolicy::new(ConfirmMode::ConfirmSensitive);
        assert_eq!(confirm_sensitive.for_command(CommandClass::Safe), ConfirmOutcome::AutoAllow);
        assert_eq!(confirm_sensitive.for_command(CommandClass::Dev), ConfirmOutcome::RequiresPrompt);
        assert_eq!(confirm_sensitive.for_command(CommandClass::Dangerous), ConfirmOutcome::RequiresPrompt);

        let confirm_all = ConfirmPolicy::new(ConfirmMode::ConfirmAll);
        assert_eq!(confirm_all.for_command(CommandClass::Safe), ConfirmOutcome::RequiresPrompt);
    }

    #[test]
    fn allowed_only_rejects_dangerous_outright_regardless_of_mode() {
        let policy = ConfirmPolicy::new(ConfirmMode::Yolo).with_allowed_only(true);
        assert_eq!(policy.for_command(CommandClass::Dangerous), ConfirmOutcome::RejectOutright);

        let policy = ConfirmPolicy::new(ConfirmMode::ConfirmAll).with_allowed_only(true);
        assert_eq!(policy.for_command(CommandClass::Dangerous), ConfirmOutcome::RejectOutright);
    }
}
