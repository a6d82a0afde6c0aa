//! Lifecycle events hooks can bind to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the agent lifecycle a hook can fire on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    PreToolUse,
    PostToolUse,
    PreLlmCall,
    PostLlmCall,
    SessionStart,
    SessionEnd,
    OnError,
    BudgetWarning,
    ContextCompress,
    AgentComplete,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PreToolUse => "pre_tool_use",
            Self::PostToolUse => "post_tool_use",
            Self::PreLlmCall => "pre_llm_call",
            Self::PostLlmCall => "post_llm_call",
            Self::SessionStart => "session_start",
            Self::SessionEnd => "session_end",
            Self::OnError => "on_error",
            Self::BudgetWarning => "budget_warning",
            Self::ContextCompress => "context_compress",
            Self::AgentComplete => "agent_complete",
        };
        write!(f, "{s}")
    }
}
