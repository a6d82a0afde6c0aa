//! Repo Indexer: a one-shot workspace tree walk plus language/line stats,
//! cached per workspace and folded into the Agent Loop's system prompt as
//! ambient repo context.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod cache;
pub mod error;
pub mod index;
pub mod language;

pub use cache::IndexCache;
pub use error::{IndexError, IndexResult};
pub use index::{FileStats, RepoIndex};
