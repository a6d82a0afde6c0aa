//! Auto-Reviewer (§4.16): a clean-context review of a diff against the
//! original task, using a read-only Agent Loop that never sees the
//! builder's step history.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod prompt;
pub mod result;
pub mod reviewer;

pub use prompt::{build_task_prompt, REVIEW_INSTRUCTIONS};
pub use result::{parse_verdict, ReviewResult};
pub use reviewer::{remediation_prompt, review};
