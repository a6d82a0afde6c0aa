//! Guardrails Engine — deterministic policy checks the LLM cannot disable,
//! evaluated before hooks and before tool execution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::Glob;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::config::{GuardrailsConfig, Severity};
use crate::state::GuardrailState;

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardrailDecision {
    Allow,
    Deny(String),
}

impl GuardrailDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardrailDecision::Allow)
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    /// Convert a denial into the [`architect_core::ToolResult`] the
    /// Execution Engine hands back to the LLM in place of running the tool.
    #[must_use]
    pub fn into_tool_result(self) -> Option<architect_core::ToolResult> {
        match self {
            GuardrailDecision::Allow => None,
            GuardrailDecision::Deny(reason) => {
                Some(architect_core::ToolResult::fail(format!("blocked by guardrails: {reason}")))
            }
        }
    }
}

/// Whether a tool is a write-like operation for `check_file_access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccessKind {
    Read,
    Write,
}

/// Result of running the quality gates at agent completion.
#[derive(Debug, Clone)]
pub struct QualityGateResult {
    pub name: String,
    pub passed: bool,
    pub required: bool,
    pub output: String,
}

/// The Guardrails Engine. Stateful across a single agent run — construct one
/// per run and call `reset` (or build a fresh engine) between runs.
pub struct GuardrailsEngine {
    config: GuardrailsConfig,
    state: Mutex<GuardrailState>,
}

impl GuardrailsEngine {
    #[must_use]
    pub fn new(config: GuardrailsConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GuardrailState::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GuardrailsConfig {
        &self.config
    }

    /// Reset the cumulative state carried within a run.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
    }

    /// `check_file_access`: write-like tools are denied on `protected_files`
    /// or `sensitive_files`; read tools are denied only on `sensitive_files`.
    pub fn check_file_access(&self, kind: FileAccessKind, path: &Path) -> GuardrailDecision {
        let path_str = path.to_string_lossy();

        if matches_any_glob(&self.config.sensitive_files, &path_str) {
            return GuardrailDecision::Deny(format!(
                "'{path_str}' matches a sensitive file pattern"
            ));
        }

        if kind == FileAccessKind::Write && matches_any_glob(&self.config.protected_files, &path_str) {
            return GuardrailDecision::Deny(format!(
                "'{path_str}' matches a protected file pattern"
            ));
        }

        GuardrailDecision::Allow
    }

    /// `check_command`: blocklist, per-run command cap, and redirection
    /// target re-checking.
    pub async fn check_command(&self, command: &str) -> GuardrailDecision {
        for pattern in &self.config.blocked_command_patterns {
            match Regex::new(pattern) {
                Ok(re) if re.is_match(command) => {
                    return GuardrailDecision::Deny(format!(
                        "command matches blocked pattern '{pattern}'"
                    ));
                }
                _ => {}
            }
        }

        if self.config.max_commands_per_run > 0 {
            let state = self.state.lock().await;
            if state.commands_executed >= self.config.max_commands_per_run {
                return GuardrailDecision::Deny(format!(
                    "per-run command cap ({}) exceeded",
                    self.config.max_commands_per_run
                ));
            }
        }

        for target in write_redirection_targets(command) {
            let decision = self.check_file_access(FileAccessKind::Write, Path::new(&target));
            if decision.is_denied() {
                return decision;
            }
        }

        for target in read_targets(command) {
            if matches_any_glob(&self.config.sensitive_files, &target) {
                return GuardrailDecision::Deny(format!(
                    "'{target}' matches a sensitive file pattern"
                ));
            }
        }

        {
            let mut state = self.state.lock().await;
            state.record_command();
        }

        GuardrailDecision::Allow
    }

    /// `check_edit_limits`: deny once the cumulative file or line-change cap
    /// is exceeded. Call BEFORE committing the write that would cross it;
    /// the caller records the touch via [`Self::record_file_touch`] after an
    /// allowed write actually lands.
    pub async fn check_edit_limits(&self, path: &Path, added_lines: usize) -> GuardrailDecision {
        let state = self.state.lock().await;

        if self.config.max_files_touched > 0 {
            let would_be_new = !state.files_modified.contains(path);
            let projected = state.files_modified.len() + usize::from(would_be_new);
            if projected > self.config.max_files_touched {
                return GuardrailDecision::Deny(format!(
                    "per-run file-touch cap ({}) exceeded",
                    self.config.max_files_touched
                ));
            }
        }

        if self.config.max_lines_changed > 0
            && state.lines_changed.saturating_add(added_lines) > self.config.max_lines_changed
        {
            return GuardrailDecision::Deny(format!(
                "per-run line-change cap ({}) exceeded",
                self.config.max_lines_changed
            ));
        }

        GuardrailDecision::Allow
    }

    /// Record a write that passed `check_edit_limits` and actually landed.
    pub async fn record_file_touch(&self, path: PathBuf, added_lines: usize) {
        self.state.lock().await.record_file_touch(path, added_lines);
    }

    /// `check_code_rules`: evaluated before a write commits. `block` rules
    /// abort the write; `warn` rules allow it and log.
    pub fn check_code_rules(&self, proposed_content: &str) -> GuardrailDecision {
        for rule in &self.config.code_rules {
            let Ok(re) = Regex::new(&rule.pattern) else {
                tracing::warn!(pattern = %rule.pattern, "code rule pattern failed to compile, skipping");
                continue;
            };
            if !re.is_match(proposed_content) {
                continue;
            }
            match rule.severity {
                Severity::Block => {
                    return GuardrailDecision::Deny(rule.message.clone());
                }
                Severity::Warn => {
                    tracing::warn!(event = "code_rule_warn", message = %rule.message, "code rule matched");
                }
            }
        }
        GuardrailDecision::Allow
    }

    /// `run_quality_gates`: run at agent completion only. Each gate runs
    /// once; a failing required gate is reported to the caller as feedback
    /// rather than as a hard denial, so the Agent Loop can resume once.
    pub async fn run_quality_gates(&self, cwd: &Path) -> Vec<QualityGateResult> {
        let mut results = Vec::with_capacity(self.config.quality_gates.len());
        for gate in &self.config.quality_gates {
            let output = tokio::time::timeout(
                Duration::from_secs(gate.timeout_secs),
                Command::new("sh")
                    .arg("-c")
                    .arg(&gate.command)
                    .current_dir(cwd)
                    .stdin(std::process::Stdio::null())
                    .output(),
            )
            .await;

            let (passed, text) = match output {
                Ok(Ok(out)) => (
                    out.status.success(),
                    format!(
                        "{}{}",
                        String::from_utf8_lossy(&out.stdout),
                        String::from_utf8_lossy(&out.stderr)
                    ),
                ),
                Ok(Err(e)) => (false, format!("failed to launch gate: {e}")),
                Err(_) => (false, format!("gate timed out after {}s", gate.timeout_secs)),
            };

            results.push(QualityGateResult {
                name: gate.name.clone(),
                passed,
                required: gate.required,
                output: text,
            });
        }
        results
    }
}

fn matches_any_glob(patterns: &[String], path: &str) -> bool {
    patterns.iter().any(|pattern| {
        Glob::new(pattern).ok().is_some_and(|g| g.compile_matcher().is_match(path))
    })
}

/// Extract write-redirection targets (`>`, `>>`, `| tee`, here-docs are not
/// file targets and are ignored).
fn write_redirection_targets(command: &str) -> Vec<String> {
    let redirect_re = Regex::new(r"(?:^|\s)>>?\s*([^\s|&;]+)").expect("valid regex");
    let tee_re = Regex::new(r"\|\s*tee\s+(?:-a\s+)?([^\s|&;]+)").expect("valid regex");
    redirect_re
        .captures_iter(command)
        .chain(tee_re.captures_iter(command))
        .map(|c| c[1].trim_matches(|ch| ch == '\'' || ch == '"').to_string())
        .collect()
}

/// Extract read targets (`cat file`, `< file`) for `sensitive_files`
/// checking.
fn read_targets(command: &str) -> Vec<String> {
    let stdin_re = Regex::new(r"(?:^|\s)<\s*([^\s|&;]+)").expect("valid regex");
    let cat_re = Regex::new(r"\bcat\s+([^\s|&;]+)").expect("valid regex");
    stdin_re
        .captures_iter(command)
        .chain(cat_re.captures_iter(command))
        .map(|c| c[1].trim_matches(|ch| ch == '\'' || ch == '"').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(config: GuardrailsConfig) -> GuardrailsEngine {
        GuardrailsEngine::new(config)
    }

    #[test]
    fn write_denied_on_protected_file() {
        let engine = engine_with(GuardrailsConfig::default());
        let decision = engine.check_file_access(FileAccessKind::Write, Path::new(".env"));
        assert!(decision.is_denied());
    }

    #[test]
    fn read_allowed_on_protected_but_not_sensitive_file() {
        let engine = engine_with(GuardrailsConfig::default());
        let decision = engine.check_file_access(FileAccessKind::Read, Path::new(".env"));
        assert!(decision.is_allowed());
    }

    #[test]
    fn read_denied_on_sensitive_file() {
        let engine = engine_with(GuardrailsConfig::default());
        let decision = engine.check_file_access(FileAccessKind::Read, Path::new("secrets/token"));
        assert!(decision.is_denied());
    }

    #[tokio::test]
    async fn command_blocklist_denies() {
        let engine = engine_with(GuardrailsConfig::default());
        let decision = engine.check_command("sudo rm -rf /tmp").await;
        assert!(decision.is_denied());
    }

    #[tokio::test]
    async fn command_cap_denies_after_limit() {
        let mut config = GuardrailsConfig::default();
        config.max_commands_per_run = 1;
        let engine = engine_with(config);

        assert!(engine.check_command("ls").await.is_allowed());
        assert!(engine.check_command("ls").await.is_denied());
    }

    #[tokio::test]
    async fn redirection_target_checked_against_sensitive_files() {
        let engine = engine_with(GuardrailsConfig::default());
        let decision = engine.check_command("echo hi > secrets/out.txt").await;
        assert!(decision.is_denied());
    }

    #[tokio::test]
    async fn edit_limits_deny_once_file_cap_exceeded() {
        let mut config = GuardrailsConfig::default();
        config.max_files_touched = 1;
        let engine = engine_with(config);

        assert!(engine.check_edit_limits(Path::new("a.rs"), 0).await.is_allowed());
        engine.record_file_touch(PathBuf::from("a.rs"), 0).await;
        assert!(engine.check_edit_limits(Path::new("b.rs"), 0).await.is_denied());
        assert!(engine.check_edit_limits(Path::new("a.rs"), 0).await.is_allowed());
    }

    #[test]
    fn code_rule_block_denies() {
        let mut config = GuardrailsConfig::default();
        config.code_rules.push(crate::config::CodeRule {
            pattern: "TODO".to_string(),
            severity: Severity::Block,
            message: "no TODOs allowed".to_string(),
        });
        let engine = engine_with(config);
        let decision = engine.check_code_rules("// TODO: fix this");
        assert!(decision.is_denied());
    }

    #[test]
    fn code_rule_warn_allows() {
        let mut config = GuardrailsConfig::default();
        config.code_rules.push(crate::config::CodeRule {
            pattern: "unwrap\\(\\)".to_string(),
            severity: Severity::Warn,
            message: "avoid unwrap".to_string(),
        });
        let engine = engine_with(config);
        let decision = engine.check_code_rules("foo.unwrap()");
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn quality_gate_runs_and_reports_failure() {
        let config = GuardrailsConfig {
            quality_gates: vec![crate::config::QualityGate {
                name: "fail".to_string(),
                command: "exit 1".to_string(),
                timeout_secs: 5,
                required: true,
            }],
            ..GuardrailsConfig::default()
        };
        let engine = engine_with(config);
        let results = engine.run_quality_gates(&std::env::temp_dir()).await;
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }
}
