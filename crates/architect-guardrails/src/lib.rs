//! Guardrails Engine (§4.4): the deterministic policy layer evaluated
//! before hooks and before tool execution. The LLM cannot disable it.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod state;

pub use config::{CodeRule, GuardrailsConfig, QualityGate, Severity};
pub use engine::{FileAccessKind, GuardrailDecision, GuardrailsEngine, QualityGateResult};
pub use error::{GuardrailError, GuardrailResult};
pub use state::GuardrailState;
