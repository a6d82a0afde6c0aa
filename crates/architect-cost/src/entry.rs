//! One row of the cost ledger.

use serde::{Deserialize, Serialize};

use crate::usage::CostSource;

/// One recorded LLM call's cost, appended to the ledger in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    pub step: usize,
    pub model: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub cached_input_tokens: usize,
    pub cost_usd: f64,
    pub source: CostSource,
}
