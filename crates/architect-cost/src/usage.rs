//! Token usage as reported by (or estimated for) one LLM call.

use serde::{Deserialize, Serialize};

/// Token counts for a single completion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Subset of `input_tokens` served from the provider's prompt cache, if
    /// the provider reports it.
    pub cached_input_tokens: usize,
}

impl Usage {
    #[must_use]
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self { input_tokens, output_tokens, cached_input_tokens: 0 }
    }

    #[must_use]
    pub fn with_cached_input(mut self, cached_input_tokens: usize) -> Self {
        self.cached_input_tokens = cached_input_tokens;
        self
    }

    #[must_use]
    pub fn total_tokens(&self) -> usize {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Which caller produced a cost entry, for reporting grouped totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostSource {
    /// The main agent loop.
    Agent,
    /// An evaluation/review pass (e.g. the Auto-Reviewer).
    Eval,
    /// A Context Manager compression summary call.
    Summary,
}
