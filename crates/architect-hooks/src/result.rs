//! What a hook invocation decided.

use serde_json::Value;

/// The effect a hook invocation has on the pending operation.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// Exit code 0, no `modified_input`: proceed unchanged.
    Allow,
    /// Exit code 2: abort the tool call; `reason` is reported to the LLM.
    Block { reason: String },
    /// Exit code 0 with a `modified_input` key in parseable JSON stdout:
    /// replace the pending tool arguments.
    Modify { modified_input: Value },
}

/// One hook's full execution record.
#[derive(Debug, Clone)]
pub struct HookExecution {
    pub hook_name: String,
    pub outcome: HookOutcome,
    /// Non-JSON (or JSON without `modified_input`) stdout, appended as
    /// additional context to the tool result text.
    pub extra_context: Option<String>,
    pub duration_ms: u64,
    /// True if the hook was launched fire-and-forget and not awaited; in
    /// that case `outcome` is always `Allow` and carries no real signal.
    pub fired_and_forgotten: bool,
}

impl HookExecution {
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self.outcome, HookOutcome::Block { .. })
    }
}
