//! Core data model shared by every other `architect-*` crate: conversation
//! messages, tool calls and results, agent run state, stop reasons, and
//! per-run configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod message;
pub mod state;

pub use config::{AgentConfig, ConfirmMode, ToolDescriptor};
pub use error::{CoreError, CoreResult};
pub use ids::SessionId;
pub use message::{Message, MessageContent, Role, ToolCall, ToolOutput, ToolResult};
pub use state::{AgentState, AgentStatus, StepResult, StopReason, ToolCallResult};
