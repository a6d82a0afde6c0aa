//! Per-run agent configuration and the tool descriptor shape shared between
//! the Tool Registry and the LLM Adapter's function-calling schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How aggressively the run asks for human confirmation before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmMode {
    /// Never prompt; guardrail blocks still apply.
    Yolo,
    /// Prompt only for actions classified sensitive.
    #[default]
    ConfirmSensitive,
    /// Prompt before every tool call.
    ConfirmAll,
}

/// Configuration for a single agent run, threaded from the CLI/config layer
/// down into the Agent Loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// System prompt text (after skill injection).
    pub system_prompt: String,
    /// Tool names this run may invoke; `None` means all registered tools.
    pub allowed_tools: Option<Vec<String>>,
    /// Confirmation policy for this run.
    pub confirm_mode: ConfirmMode,
    /// Hard cap on agent-loop steps.
    pub max_steps: u32,
    /// Hard cap on USD spend for this run, if any.
    pub max_cost_usd: Option<f64>,
    /// Wall-clock timeout for the whole run, in seconds, if any.
    pub timeout_secs: Option<u64>,
    /// Whether independent tool calls within one LLM response may run
    /// concurrently (§4.11 step 5). Confirmation requirements can still
    /// force a sequential batch regardless of this flag.
    pub parallel_tools: bool,
    /// Whether write-like tools record a planned action instead of
    /// touching the workspace.
    pub dry_run: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            allowed_tools: None,
            confirm_mode: ConfirmMode::default(),
            max_steps: 50,
            max_cost_usd: None,
            timeout_secs: None,
            parallel_tools: true,
            dry_run: false,
        }
    }
}

impl AgentConfig {
    /// Whether a tool name is permitted for this run. `allowed_tools ==
    /// None` means all registered tools are permitted.
    #[must_use]
    pub fn allows_tool(&self, name: &str) -> bool {
        match &self.allowed_tools {
            None => true,
            Some(allowed) => allowed.iter().any(|t| t == name),
        }
    }
}

/// Describes one registered tool for both the Tool Registry and the LLM's
/// function-calling schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within a registry.
    pub name: String,
    /// Human/LLM-facing description.
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub argument_schema: Value,
    /// Whether this tool is classified sensitive for confirmation purposes.
    pub sensitive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_allows_everything() {
        let cfg = AgentConfig::default();
        assert!(cfg.allows_tool("anything"));
    }

    #[test]
    fn non_empty_allow_list_restricts() {
        let mut cfg = AgentConfig::default();
        cfg.allowed_tools = Some(vec!["read_file".into()]);
        assert!(cfg.allows_tool("read_file"));
        assert!(!cfg.allows_tool("run_command"));
    }

    #[test]
    fn default_confirm_mode_is_confirm_sensitive() {
        assert_eq!(ConfirmMode::default(), ConfirmMode::ConfirmSensitive);
    }
}
