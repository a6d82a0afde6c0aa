//! Agent Loop and Session persistence (§4.11, §3): the stateful heart of
//! one agent run, binding every lower-level engine (tools, guardrails,
//! hooks, confirmation, context, cost, the LLM adapter) into the
//! single-threaded control loop.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod agent_loop;
pub mod error;
pub mod interrupt;
pub mod session;
pub mod summarizer;

pub use agent_loop::{AgentLoop, AgentRunOutcome};
pub use error::{RuntimeError, RuntimeResult};
pub use interrupt::InterruptFlag;
pub use session::{generate_session_id, resolve_session_id, Session, SessionStore};
pub use summarizer::LlmSummarizer;
