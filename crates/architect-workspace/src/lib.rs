//! Path Validator: confine every tool-facing path to a workspace root.
//!
//! Every tool and guardrail check takes a [`WorkspaceConfig`] explicitly
//! rather than reading an ambient global, so the Parallel Runner can
//! construct one instance per worktree with no shared state.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod boundaries;
pub mod config;
pub mod error;

pub use boundaries::{validate_delete, validate_path, PathCheck, WorkspaceBoundary};
pub use config::{AutoAllow, EscapePolicy, WorkspaceConfig};
pub use error::{WorkspaceError, WorkspaceResult};
