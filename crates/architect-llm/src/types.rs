//! Normalized request/response shapes: every provider implementation
//! translates to and from these, so the rest of the engine never touches
//! provider wire formats.

use architect_core::{Message, ToolCall, ToolDescriptor};
use architect_cost::Usage;
use serde::{Deserialize, Serialize};

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Natural end of turn.
    EndTurn,
    /// Hit the max-tokens cap.
    MaxTokens,
    /// The model requested tool calls.
    ToolUse,
    /// A configured stop sequence was hit.
    StopSequence,
}

/// The normalized result of [`crate::provider::LlmProvider::completion`],
/// identical in shape whether it came from streaming or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl CompletionResponse {
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert into the `assistant` [`Message`] this response represents:
    /// tool calls if any were requested, otherwise plain text.
    #[must_use]
    pub fn into_message(self) -> Message {
        if self.tool_calls.is_empty() {
            Message::assistant(self.content)
        } else {
            Message::assistant_tool_calls(self.tool_calls)
        }
    }
}

/// One piece of a streamed completion. Tool-call fragments arrive
/// piecewise (start carries id+name, delta carries a JSON-arguments
/// chunk, end closes it) and must be accumulated by the caller.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    TextDelta(String),
    ToolCallStart { index: usize, id: String, name: String },
    ToolCallDelta { index: usize, args_delta: String },
    ToolCallEnd { index: usize },
    Usage(Usage),
    Done { finish_reason: FinishReason },
}

/// Callback invoked once per [`StreamChunk`] as a streaming completion
/// progresses.
pub type StreamCallback<'a> = dyn FnMut(StreamChunk) + Send + 'a;

/// The tool schema sent alongside a completion request. Reuses the Tool
/// Registry's descriptor shape directly; providers translate it to their
/// own function-calling format.
pub type ToolSchema = ToolDescriptor;
