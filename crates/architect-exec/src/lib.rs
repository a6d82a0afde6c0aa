//! Execution Engine (§4.6): the per-tool-call pipeline binding guardrails,
//! hooks, and confirmation to tool dispatch. Resolution, validation,
//! guardrail checks, hook firing, confirmation, dry-run recording, and
//! execution all happen here, in that order, for every tool call the Agent
//! Loop makes.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod dry_run;
pub mod engine;
pub mod error;
pub mod target;

pub use dry_run::{DryRunTracker, PlannedAction};
pub use engine::ExecutionEngine;
pub use error::{ExecError, ExecResult};
pub use target::{count_lines, extract_path, extract_proposed_content};
