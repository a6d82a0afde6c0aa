//! Accumulates the cost ledger and enforces the optional budget.

use std::collections::HashMap;

use crate::entry::CostEntry;
use crate::price_table::PriceTable;
use crate::usage::{CostSource, Usage};

/// Per-run cost accounting. `record` never fails: pricing gaps fall back to
/// a generic rate, and budget overruns only set a flag the Agent Loop reads
/// on its own safety check.
#[derive(Debug)]
pub struct CostTracker {
    ledger: Vec<CostEntry>,
    price_table: PriceTable,
    warn_at_usd: Option<f64>,
    budget_usd: Option<f64>,
    warned: bool,
    over_budget: bool,
}

impl CostTracker {
    #[must_use]
    pub fn new(price_table: PriceTable) -> Self {
        Self {
            ledger: Vec::new(),
            price_table,
            warn_at_usd: None,
            budget_usd: None,
            warned: false,
            over_budget: false,
        }
    }

    #[must_use]
    pub fn with_warn_at(mut self, warn_at_usd: f64) -> Self {
        self.warn_at_usd = Some(warn_at_usd);
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget_usd: f64) -> Self {
        self.budget_usd = Some(budget_usd);
        self
    }

    /// Record one LLM call's usage, computing its cost from the price
    /// table. Accumulates totals and, if crossed, flips `over_budget` or
    /// logs a `warn_at_usd` warning (each fires at most once per run).
    pub fn record(&mut self, step: usize, model: impl Into<String>, usage: Usage, source: CostSource) -> CostEntry {
        let model = model.into();
        let rate = self.price_table.rate_for(&model);
        let cost_usd = rate.cost_usd(&usage);

        let entry = CostEntry {
            step,
            model,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            cached_input_tokens: usage.cached_input_tokens,
            cost_usd,
            source,
        };
        self.ledger.push(entry.clone());

        let total = self.total_cost_usd();

        if !self.warned
            && let Some(warn_at) = self.warn_at_usd
            && total >= warn_at
        {
            self.warned = true;
            tracing::warn!(total_cost_usd = total, warn_at_usd = warn_at, "cost crossed warning threshold");
        }

        if let Some(budget) = self.budget_usd
            && total > budget
        {
            self.over_budget = true;
        }

        entry
    }

    #[must_use]
    pub fn ledger(&self) -> &[CostEntry] {
        &self.ledger
    }

    #[must_use]
    pub fn total_cost_usd(&self) -> f64 {
        self.ledger.iter().map(|e| e.cost_usd).sum()
    }

    #[must_use]
    pub fn total_tokens(&self) -> (usize, usize) {
        self.ledger.iter().fold((0, 0), |(input, output), e| {
            (input + e.input_tokens, output + e.output_tokens)
        })
    }

    #[must_use]
    pub fn total_by_source(&self) -> HashMap<CostSource, f64> {
        let mut totals = HashMap::new();
        for entry in &self.ledger {
            *totals.entry(entry.source).or_insert(0.0) += entry.cost_usd;
        }
        totals
    }

    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.over_budget
    }
}
