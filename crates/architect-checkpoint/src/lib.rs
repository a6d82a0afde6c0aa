//! Checkpoint Manager (§4.15): git-backed restore points for an agent
//! run, using ordinary commits tagged with an `architect:checkpoint`
//! subject prefix rather than a bespoke persistence format.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod manager;

pub use error::{CheckpointError, CheckpointResult};
pub use manager::{Checkpoint, CheckpointManager};
