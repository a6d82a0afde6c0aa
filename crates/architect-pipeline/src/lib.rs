//! Pipeline Runner (§4.13): executes an ordered list of YAML-defined steps,
//! each a fresh Agent Loop turn, with variable substitution, conditional
//! skipping, per-step checks, and optional checkpointing.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod condition;
pub mod error;
pub mod runner;
pub mod substitute;
pub mod types;
pub mod validate;

pub use error::{PipelineError, PipelineResult};
pub use runner::{plan, PipelineOutcome, PipelineRunner, StepCheckOutcome, StepOutcome, StepStatus};
pub use types::{PipelineDef, PipelineStep};
pub use validate::{validate, PipelineValidationError};
