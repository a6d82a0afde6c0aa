//! Model pricing, keyed by exact name first, then by prefix, with a
//! generic fallback.

use std::collections::HashMap;

use crate::usage::Usage;

/// USD-per-million-token rates for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
    /// Rate applied to `cached_input_tokens` instead of `input_per_million`,
    /// when the provider distinguishes cached reads.
    pub cached_input_per_million: Option<f64>,
}

impl ModelRate {
    #[must_use]
    pub fn cost_usd(&self, usage: &Usage) -> f64 {
        let uncached_input = usage.input_tokens.saturating_sub(usage.cached_input_tokens);
        let cached_rate = self.cached_input_per_million.unwrap_or(self.input_per_million);

        let input_cost = (uncached_input as f64 / 1_000_000.0) * self.input_per_million
            + (usage.cached_input_tokens as f64 / 1_000_000.0) * cached_rate;
        let output_cost = (usage.output_tokens as f64 / 1_000_000.0) * self.output_per_million;
        input_cost + output_cost
    }
}

/// The fallback rate used for any model not found by exact name or prefix:
/// $3 in / $15 out per million tokens.
const FALLBACK_RATE: ModelRate = ModelRate {
    input_per_million: 3.0,
    output_per_million: 15.0,
    cached_input_per_million: None,
};

/// Model → rate lookup, matched by exact name then by longest prefix.
#[derive(Debug, Clone)]
pub struct PriceTable {
    exact: HashMap<String, ModelRate>,
    prefixes: Vec<(String, ModelRate)>,
}

impl PriceTable {
    #[must_use]
    pub fn new() -> Self {
        Self { exact: HashMap::new(), prefixes: Vec::new() }
    }

    #[must_use]
    pub fn with_exact(mut self, model: impl Into<String>, rate: ModelRate) -> Self {
        self.exact.insert(model.into(), rate);
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>, rate: ModelRate) -> Self {
        self.prefixes.push((prefix.into(), rate));
        self
    }

    /// Resolve a model name to a rate: exact match, then the longest
    /// matching prefix, then the generic fallback.
    #[must_use]
    pub fn rate_for(&self, model: &str) -> ModelRate {
        if let Some(rate) = self.exact.get(model) {
            return *rate;
        }
        self.prefixes
            .iter()
            .filter(|(prefix, _)| model.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, rate)| *rate)
            .unwrap_or(FALLBACK_RATE)
    }
}

impl Default for PriceTable {
    /// Seeds a handful of well-known model families. Unknown models fall
    /// back to the generic $3/$15-per-million rate.
    fn default() -> Self {
        Self::new()
            .with_prefix(
                "claude-3-5-haiku",
                ModelRate { input_per_million: 0.80, output_per_million: 4.0, cached_input_per_million: Some(0.08) },
            )
            .with_prefix(
                "claude-3-opus",
                ModelRate { input_per_million: 15.0, output_per_million: 75.0, cached_input_per_million: Some(1.50) },
            )
            .with_prefix(
                "claude",
                ModelRate { input_per_million: 3.0, output_per_million: 15.0, cached_input_per_million: Some(0.30) },
            )
            .with_prefix(
                "gpt-4o-mini",
                ModelRate { input_per_million: 0.15, output_per_million: 0.60, cached_input_per_million: Some(0.075) },
            )
            .with_prefix(
                "gpt-4o",
                ModelRate { input_per_million: 2.50, output_per_million: 10.0, cached_input_per_million: Some(1.25) },
            )
    }
}
