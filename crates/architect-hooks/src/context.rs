//! The payload handed to a hook: JSON on stdin, plus `ARCHITECT_*`
//! environment variables exposing the same fields.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::event::HookEvent;

/// Everything a hook invocation might need to know about the event that
/// triggered it.
#[derive(Debug, Clone, Serialize)]
pub struct HookContext {
    pub event: HookEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Extra event-specific data (tool arguments, error message, etc.).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
    /// The outcome of the tool call this hook concerns, present on
    /// `post_tool_use` invocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<architect_core::ToolResult>,
    /// 1-indexed step number within the agent run this event occurred in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl HookContext {
    /// Build a context for a `pre_tool_use`/`post_tool_use` invocation from
    /// the tool call it concerns.
    #[must_use]
    pub fn for_tool_call(event: HookEvent, call: &architect_core::ToolCall) -> Self {
        Self::new(event).with_tool_name(call.name.clone()).with_extra(call.arguments.clone())
    }

    #[must_use]
    pub fn new(event: HookEvent) -> Self {
        Self {
            event,
            tool_name: None,
            file_path: None,
            session_id: None,
            extra: None,
            tool_result: None,
            step: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }

    #[must_use]
    pub fn with_tool_result(mut self, tool_result: architect_core::ToolResult) -> Self {
        self.tool_result = Some(tool_result);
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    /// The name matched against a hook's `matcher` regex: the tool name if
    /// present, else the event name.
    #[must_use]
    pub fn match_subject(&self) -> String {
        self.tool_name.clone().unwrap_or_else(|| self.event.to_string())
    }

    /// JSON payload written to the hook's stdin.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// `ARCHITECT_*` environment variables exposing the same fields.
    #[must_use]
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![("ARCHITECT_EVENT".to_string(), self.event.to_string())];
        if let Some(ref tool_name) = self.tool_name {
            vars.push(("ARCHITECT_TOOL_NAME".to_string(), tool_name.clone()));
        }
        if let Some(ref file_path) = self.file_path {
            vars.push(("ARCHITECT_EDITED_FILE".to_string(), file_path.clone()));
        }
        if let Some(ref session_id) = self.session_id {
            vars.push(("ARCHITECT_SESSION_ID".to_string(), session_id.clone()));
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::ToolResult;

    #[test]
    fn payload_carries_tool_result_step_and_timestamp() {
        let context = HookContext::new(HookEvent::PostToolUse)
            .with_tool_result(ToolResult::ok("done"))
            .with_step(3);
        let payload = context.to_payload();
        assert_eq!(payload["tool_result"]["success"], true);
        assert_eq!(payload["step"], 3);
        assert!(payload["timestamp"].is_string());
    }

    #[test]
    fn tool_result_and_step_absent_when_unset() {
        let payload = HookContext::new(HookEvent::SessionStart).to_payload();
        assert!(payload.get("tool_result").is_none());
        assert!(payload.get("step").is_none());
    }

    #[test]
    fn env_vars_expose_edited_file_under_documented_name() {
        let context = HookContext::new(HookEvent::PostToolUse).with_file_path("src/main.rs");
        let vars = context.to_env_vars();
        assert!(vars.contains(&("ARCHITECT_EDITED_FILE".to_string(), "src/main.rs".to_string())));
    }
}
