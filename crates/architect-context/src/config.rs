//! Tunables for the three compression levels.

/// Context Manager configuration. All fields have defaults matching a
/// roughly 100k-token context window budget.
#[derive(Debug, Clone, Copy)]
pub struct ContextConfig {
    /// Level 1: truncate a single tool result once its estimated token
    /// count exceeds this. Zero disables tool-output truncation.
    pub max_tool_result_tokens: usize,
    /// Level 2/3: the hard context window, in estimated tokens.
    pub max_context_tokens: usize,
    /// Level 2: trigger old-turn compression once the tool-exchange count
    /// exceeds this.
    pub summarize_after_steps: usize,
    /// Level 2: number of most recent steps (each ~3 messages: assistant
    /// tool-call, tool result, and any follow-up) kept verbatim.
    pub keep_recent_steps: usize,
    /// Level 2: compression triggers once estimated tokens exceed this
    /// fraction of `max_context_tokens`.
    pub compress_threshold: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_tool_result_tokens: 4_000,
            max_context_tokens: 100_000,
            summarize_after_steps: 20,
            keep_recent_steps: 5,
            compress_threshold: 0.75,
        }
    }
}
