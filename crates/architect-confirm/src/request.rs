//! What gets shown to the operator when a prompt is required.

/// A pending tool call awaiting operator confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmRequest {
    pub tool_name: String,
    /// Human-readable summary of the arguments (not the raw JSON — the CLI
    /// handler renders this directly).
    pub args_summary: String,
    /// Why this call needs a prompt, for display context (e.g. "sensitive
    /// tool", "dangerous command").
    pub reason: String,
}

impl ConfirmRequest {
    #[must_use]
    pub fn new(tool_name: impl Into<String>, args_summary: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            args_summary: args_summary.into(),
            reason: reason.into(),
        }
    }
}

/// The operator's response to a [`ConfirmRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmDecision {
    /// `y` — run this call.
    Accept,
    /// `n` — skip this call, report rejection to the LLM.
    Reject,
    /// `a` — terminate the loop with `USER_INTERRUPT`.
    Abort,
}
