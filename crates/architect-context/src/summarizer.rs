//! The Context Manager needs one LLM call to compress old turns, but must
//! not depend on `architect-llm` directly (that crate sits above this one
//! in the dependency graph). Callers supply a [`Summarizer`] instead.

use async_trait::async_trait;

/// Produces a short recap of a block of conversation text. Implemented by
/// `architect-runtime` on top of the LLM Adapter.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `transcript` (already formatted as plain text) into a
    /// recap of roughly 200 words or fewer. Returns `Err` on any failure;
    /// the caller falls back to a mechanical summary.
    async fn summarize(&self, transcript: &str) -> Result<String, String>;
}
