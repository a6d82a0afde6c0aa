//! Context Manager (§4.7): tool-output truncation, old-turn compression,
//! and a hard context-window cap, applied in that order on every LLM call
//! after the first.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod estimate;
pub mod manager;
pub mod summarizer;
pub mod truncate;

pub use config::ContextConfig;
pub use estimate::{estimate_messages, estimate_text};
pub use manager::{ContextManager, ContextRunOutcome};
pub use summarizer::Summarizer;
pub use truncate::truncate_tool_output;
