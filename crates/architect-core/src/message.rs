//! Conversation messages, tool calls, and tool results.
//!
//! Mirrors the shape an LLM provider speaks: a role-tagged sequence of
//! messages where assistant turns may carry tool-call stubs and tool turns
//! reference the call id they answer. Ordering is significant and preserved.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A role-tagged entry in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: Role,
    /// Message content.
    pub content: MessageContent,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a plain-text assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message that requests tool calls.
    #[must_use]
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::ToolCalls(calls),
        }
    }

    /// Create a `tool` message referencing the call id it answers.
    #[must_use]
    pub fn tool_output(call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::ToolOutput(ToolOutput {
                call_id: call_id.into(),
                text: text.into(),
            }),
        }
    }

    /// Return the text content, if this message is plain text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Return the tool calls, if this message carries any.
    #[must_use]
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match &self.content {
            MessageContent::ToolCalls(calls) => Some(calls),
            _ => None,
        }
    }

    /// Return the tool output, if this is a `tool` message.
    #[must_use]
    pub fn tool_output_ref(&self) -> Option<&ToolOutput> {
        match &self.content {
            MessageContent::ToolOutput(out) => Some(out),
            _ => None,
        }
    }

    /// Rough token estimate for this message: `chars / 4`, per the Context
    /// Manager's estimation rule.
    #[must_use]
    pub fn estimated_tokens(&self) -> usize {
        let chars = match &self.content {
            MessageContent::Text(s) => s.len(),
            MessageContent::ToolCalls(calls) => calls
                .iter()
                .map(|c| c.name.len() + c.arguments.to_string().len())
                .sum(),
            MessageContent::ToolOutput(out) => out.text.len(),
        };
        chars / 4
    }
}

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt / instructions.
    System,
    /// User input.
    User,
    /// Assistant output (text or tool call stubs).
    Assistant,
    /// Tool result, bound to a prior tool call id.
    Tool,
}

/// The payload of a [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// One or more tool-call requests from the assistant.
    ToolCalls(Vec<ToolCall>),
    /// The textual result of one tool call, referencing its id.
    ToolOutput(ToolOutput),
}

/// The textual content of a `tool` message: the id of the [`ToolCall`] it
/// answers, plus the text surfaced back to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The id of the [`ToolCall`] this answers.
    pub call_id: String,
    /// Text surfaced to the LLM: the tool's output, or a formatted error.
    pub text: String,
}

/// A tool call requested by the LLM.
///
/// IDs are unique within one LLM response; they bind an assistant request to
/// the subsequent `tool` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call id (scoped to one LLM response).
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Tool arguments as raw JSON — validated by the tool before execution.
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call with empty arguments.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// The outcome of executing one tool call. Tools never raise; failures are
/// reported here and surfaced back to the LLM as the `tool` message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the call succeeded.
    pub success: bool,
    /// Human/LLM-facing output text.
    pub output: String,
    /// Error detail, present only when `success` is false.
    pub error: Option<String>,
}

impl ToolResult {
    /// Build a success result.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// Build a failure result. `output` mirrors `error` so the LLM always
    /// has something to read from `output`.
    pub fn fail(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            output: error.clone(),
            error: Some(error),
        }
    }

    /// The text that should be surfaced back to the LLM for this result.
    #[must_use]
    pub fn display_text(&self) -> &str {
        if self.success {
            &self.output
        } else {
            self.error.as_deref().unwrap_or(&self.output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_round_trip() {
        let m = Message::user("hello");
        assert_eq!(m.text(), Some("hello"));
        assert!(m.tool_calls().is_none());
    }

    #[test]
    fn tool_call_message_carries_calls() {
        let calls = vec![ToolCall::new("1", "read_file")];
        let m = Message::assistant_tool_calls(calls);
        assert_eq!(m.tool_calls().unwrap().len(), 1);
        assert!(m.text().is_none());
    }

    #[test]
    fn tool_output_references_call_id() {
        let m = Message::tool_output("1", "contents");
        let out = m.tool_output_ref().unwrap();
        assert_eq!(out.call_id, "1");
        assert_eq!(out.text, "contents");
    }

    #[test]
    fn tool_result_success_and_failure() {
        let ok = ToolResult::ok("contents");
        assert!(ok.success);
        assert!(ok.error.is_none());
        assert_eq!(ok.display_text(), "contents");

        let err = ToolResult::fail("not found");
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("not found"));
        assert_eq!(err.display_text(), "not found");
    }

    #[test]
    fn estimated_tokens_scales_with_length() {
        let short = Message::user("hi").estimated_tokens();
        let long = Message::user("x".repeat(400)).estimated_tokens();
        assert!(long > short);
    }
}
