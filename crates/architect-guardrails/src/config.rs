//! Guardrails configuration: the admin-set hard boundaries the LLM cannot
//! disable.

use serde::{Deserialize, Serialize};

/// Severity of a code rule match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Allows the write but logs the match.
    Warn,
    /// Aborts the write with a structured error returned to the LLM.
    Block,
}

/// A single code rule checked against proposed write content before it
/// commits (`check_code_rules`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeRule {
    /// Regex pattern matched against the proposed file content.
    pub pattern: String,
    pub severity: Severity,
    /// Message surfaced to the LLM (on block) or the log (on warn).
    pub message: String,
}

/// A shell command run once at agent completion to gate a successful finish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityGate {
    pub name: String,
    pub command: String,
    #[serde(default = "default_gate_timeout_secs")]
    pub timeout_secs: u64,
    /// If true, a failing gate sends feedback to the LLM and resumes the
    /// loop once; if false, failure is logged but does not block completion.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_gate_timeout_secs() -> u64 {
    120
}

fn default_required() -> bool {
    true
}

/// The Guardrails Engine's configuration: patterns, limits, and gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardrailsConfig {
    /// Glob patterns write-like tools (write, edit, delete, apply-patch) may
    /// never target.
    pub protected_files: Vec<String>,
    /// Glob patterns neither read nor write tools may target.
    pub sensitive_files: Vec<String>,
    /// Regex patterns that unconditionally deny a `run_command` invocation.
    pub blocked_command_patterns: Vec<String>,
    /// Maximum number of commands executed in one run. `0` = unlimited.
    pub max_commands_per_run: usize,
    /// Maximum distinct files touched in one run. `0` = unlimited.
    pub max_files_touched: usize,
    /// Maximum cumulative lines changed in one run. `0` = unlimited.
    pub max_lines_changed: usize,
    pub code_rules: Vec<CodeRule>,
    pub quality_gates: Vec<QualityGate>,
}

impl Default for GuardrailsConfig {
    /// Sensible defaults: block catastrophic paths and obviously destructive
    /// commands, no edit limits, no code rules or quality gates.
    fn default() -> Self {
        Self {
            protected_files: vec![
                "**/.git/**".to_string(),
                "**/.env".to_string(),
                "**/.env.*".to_string(),
                "**/*.pem".to_string(),
                "**/*.key".to_string(),
            ],
            sensitive_files: vec![
                "**/secrets/**".to_string(),
                "**/.ssh/**".to_string(),
                "**/credentials*".to_string(),
            ],
            blocked_command_patterns: vec![
                r"rm\s+-rf\s+/(\s|$)".to_string(),
                r"\bsudo\b".to_string(),
                r"\bmkfs\b".to_string(),
            ],
            max_commands_per_run: 0,
            max_files_touched: 0,
            max_lines_changed: 0,
            code_rules: Vec::new(),
            quality_gates: Vec::new(),
        }
    }
}
