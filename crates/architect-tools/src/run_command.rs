//! `run_command` tool — executes a shell command under four layers of
//! restriction: blocklist, classification, resource limits, directory
//! confinement. The security-critical tool in this crate.
//!
//! Classification (layer 2) drives the Confirmation Policy's decision of
//! whether to ask before running — that policy lives one layer up and calls
//! [`classify_command`] directly rather than relying on the static
//! [`crate::BuiltinTool::sensitive`] flag, since a single tool spans three
//! risk classes depending on the command string.

use std::path::PathBuf;

use architect_core::ToolResult;
use regex::Regex;
use serde_json::Value;
use tokio::process::Command;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Default timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Maximum timeout in milliseconds; requests above this are clamped.
const MAX_TIMEOUT_MS: u64 = 600_000;
/// Sentinel used to extract the post-command working directory.
const CWD_SENTINEL: &str = "__ARCHITECT_CWD__";
/// Fraction of truncated output kept from the head.
const HEAD_FRACTION: f64 = 0.60;
/// Fraction of truncated output kept from the tail.
const TAIL_FRACTION: f64 = 0.25;

/// Risk class assigned to a command string by [`classify_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Read-only: `ls`, `cat`, `git status`, `git log`, `git diff`, `grep`,
    /// `pwd`, `env`, version queries.
    Safe,
    /// Test and build tooling: `pytest`, `mypy`, `ruff`, `cargo test`,
    /// `cargo build`, `npm test`, `npm run`, `make`, `tsc`, `go test`,
    /// `go build`, `eslint`, `black --check`, `pip install`, `npm install`.
    Dev,
    /// Anything not matched by the safe or dev patterns.
    Dangerous,
}

/// Classify a command string into a risk class (layer 2).
#[must_use]
pub fn classify_command(command: &str) -> CommandClass {
    let head = command.trim_start();
    let safe_prefixes = [
        "ls", "cat ", "cat\t", "pwd", "env", "git status", "git log", "git diff", "grep ",
        "rg ", "find ", "which ", "echo ",
    ];
    let version_query = head.ends_with("--version") || head.ends_with("-v") || head == "cat";
    if safe_prefixes.iter().any(|p| head.starts_with(p)) || version_query {
        return CommandClass::Safe;
    }

    let dev_prefixes = [
        "pytest", "mypy", "ruff", "cargo test", "cargo build", "cargo check", "cargo clippy",
        "npm test", "npm run", "npm install", "make", "tsc", "go test", "go build", "eslint",
        "black --check", "pip install",
    ];
    if dev_prefixes.iter().any(|p| head.starts_with(p)) {
        return CommandClass::Dev;
    }

    CommandClass::Dangerous
}

/// Regex patterns rejected unconditionally, regardless of confirmation mode.
fn blocklist() -> &'static [Regex] {
    use std::sync::OnceLock;
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"rm\s+-rf\s+/(\s|$)",
            r"\bsudo\b",
            r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            r"/dev/sd[a-z]",
            r"curl[^|]*\|\s*(ba)?sh",
            r"wget[^|]*\|\s*(ba)?sh",
            r"\bmkfs\b",
            r"chmod\s+777",
            r"killall\s+-9",
            r"dd\s+.*of=/dev/",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("blocklist pattern is valid"))
        .collect()
    })
}

/// Extract redirection targets (`>`, `>>`, `2>`, `<`) from a command string,
/// for re-checking against the workspace boundary (layer 4).
fn redirection_targets(command: &str) -> Vec<String> {
    let re = Regex::new(r"(?:^|\s)(?:\d*>>?|<)\s*([^\s|&;]+)").expect("redirection regex is valid");
    re.captures_iter(command)
        .map(|c| c[1].trim_matches(|ch| ch == '\'' || ch == '"').to_string())
        .collect()
}

/// Built-in tool for executing shell commands.
pub struct RunCommandTool;

impl RunCommandTool {
    /// Construct the tool. Takes no arguments; reserved for future
    /// per-instance blocklist configuration.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for RunCommandTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BuiltinTool for RunCommandTool {
    fn name(&self) -> &'static str {
        "run_command"
    }

    fn description(&self) -> &'static str {
        "Executes a shell command. Working directory persists between calls \
         within one run. Commands are classified safe/dev/dangerous and may \
         require confirmation depending on the active confirmation mode; a \
         fixed blocklist rejects destructive commands unconditionally. \
         Default timeout 30s (max 600s)."
    }

    fn sensitive(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "cwd": {
                    "type": "string",
                    "description": "Working directory, relative to the workspace root (defaults to the root, or the persisted cwd from a prior call)"
                },
                "timeout_ms": {
                    "type": "integer",
                    "description": "Timeout in milliseconds (default 30000, max 600000)"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("arguments must be an object".into())
        })?;
        for key in obj.keys() {
            if !["command", "cwd", "timeout_ms"].contains(&key.as_str()) {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        if !obj.get("command").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("command is required".into()));
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let Some(command) = args.get("command").and_then(Value::as_str) else {
            return ToolResult::fail("command is required");
        };

        if let Some(pattern) = blocklist().iter().find(|p| p.is_match(command)) {
            return ToolResult::fail(format!("command rejected by blocklist: {}", pattern.as_str()));
        }

        for target in redirection_targets(command) {
            if let Err(e) =
                architect_workspace::validate_path(std::path::Path::new(&target), &ctx.workspace)
            {
                return ToolResult::fail(format!(
                    "redirection target '{target}' rejected: {e}"
                ));
            }
        }

        let cwd = match args.get("cwd").and_then(Value::as_str) {
            Some(rel) => match architect_workspace::validate_path(
                std::path::Path::new(rel),
                &ctx.workspace,
            ) {
                Ok(p) => p,
                Err(e) => return ToolResult::fail(format!("cwd rejected: {e}")),
            },
            None => ctx.cwd.read().await.clone(),
        };

        let timeout_ms = args
            .get("timeout_ms")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
            .min(MAX_TIMEOUT_MS);

        if ctx.dry_run {
            return ToolResult::ok(format!("[DRY-RUN] would run: {command}"));
        }

        let wrapped = format!(
            "{command}\n__ARCHITECT_EXIT__=$?\necho \"{CWD_SENTINEL}\"\npwd\nexit $__ARCHITECT_EXIT__"
        );

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            run_shell(&wrapped, &cwd),
        )
        .await;

        match result {
            Ok(Ok((stdout, stderr, exit_code))) => {
                let (output, new_cwd) = parse_sentinel_output(&stdout);

                if let Some(new_cwd) = new_cwd {
                    let mut cwd_lock = ctx.cwd.write().await;
                    *cwd_lock = new_cwd;
                }

                let mut result_text = String::new();
                if !output.is_empty() {
                    result_text.push_str(&truncate_head_tail(&output));
                }
                if !stderr.is_empty() {
                    if !result_text.is_empty() {
                        result_text.push('\n');
                    }
                    result_text.push_str("STDERR:\n");
                    result_text.push_str(&truncate_head_tail(&stderr));
                }
                if exit_code != 0 {
                    if !result_text.is_empty() {
                        result_text.push('\n');
                    }
                    result_text.push_str("(exit code: ");
                    result_text.push_str(&exit_code.to_string());
                    result_text.push(')');
                }
                if result_text.is_empty() {
                    result_text.push_str("(no output)");
                }

                ToolResult::ok(result_text)
            }
            Ok(Err(e)) => ToolResult::fail(format!("execution failed: {e}")),
            Err(_) => ToolResult::fail(format!("command timed out after {timeout_ms}ms")),
        }
    }
}

/// Run a shell command with stdin closed, capturing stdout/stderr/exit code.
async fn run_shell(command: &str, cwd: &std::path::Path) -> std::io::Result<(String, String, i32)> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(std::process::Stdio::null())
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    Ok((stdout, stderr, exit_code))
}

/// Parse the sentinel from stdout to extract command output and new cwd.
fn parse_sentinel_output(stdout: &str) -> (String, Option<PathBuf>) {
    if let Some(sentinel_pos) = stdout.find(CWD_SENTINEL) {
        let output = stdout[..sentinel_pos].trim_end().to_string();
        let after_sentinel = &stdout[sentinel_pos + CWD_SENTINEL.len()..];
        let new_cwd = after_sentinel
            .lines()
            .find(|l| !l.is_empty())
            .map(|l| PathBuf::from(l.trim()));
        (output, new_cwd)
    } else {
        (stdout.to_string(), None)
    }
}

/// Truncate long output preserving ~60% of lines from the head and ~25%
/// from the tail, dropping the middle with a notice (layer 3).
fn truncate_head_tail(text: &str) -> String {
    if text.len() <= crate::MAX_OUTPUT_CHARS {
        return text.to_string();
    }
    let lines: Vec<&str> = text.lines().collect();

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let head_count = (lines.len() as f64 * HEAD_FRACTION) as usize;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let tail_count = (lines.len() as f64 * TAIL_FRACTION) as usize;

    if head_count + tail_count >= lines.len() {
        return text.to_string();
    }

    let mut out = String::new();
    for line in &lines[..head_count] {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!(
        "\n... ({} lines omitted) ...\n\n",
        lines.len() - head_count - tail_count
    ));
    for line in &lines[lines.len() - tail_count..] {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_workspace::WorkspaceConfig;
    use tempfile::TempDir;

    fn ctx(root: &std::path::Path) -> ToolContext {
        ToolContext::new(WorkspaceConfig::new(root))
    }

    #[tokio::test]
    async fn runs_simple_command() {
        let dir = TempDir::new().unwrap();
        let result = RunCommandTool::new()
            .execute(serde_json::json!({"command": "echo hello"}), &ctx(dir.path()))
            .await;

        assert!(result.success);
        assert!(result.output.contains("hello"));
    }

    #[tokio::test]
    async fn reports_nonzero_exit_code() {
        let dir = TempDir::new().unwrap();
        let result = RunCommandTool::new()
            .execute(serde_json::json!({"command": "exit 7"}), &ctx(dir.path()))
            .await;

        assert!(result.success);
        assert!(result.output.contains("exit code: 7"));
    }

    #[tokio::test]
    async fn blocklist_rejects_rm_rf_root() {
        let dir = TempDir::new().unwrap();
        let result = RunCommandTool::new()
            .execute(serde_json::json!({"command": "rm -rf /"}), &ctx(dir.path()))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("blocklist"));
    }

    #[tokio::test]
    async fn blocklist_rejects_sudo() {
        let dir = TempDir::new().unwrap();
        let result = RunCommandTool::new()
            .execute(serde_json::json!({"command": "sudo apt install foo"}), &ctx(dir.path()))
            .await;

        assert!(!result.success);
    }

    #[tokio::test]
    async fn cwd_persists_across_calls() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let c = ctx(dir.path());

        RunCommandTool::new()
            .execute(serde_json::json!({"command": "cd subdir"}), &c)
            .await;

        let result = RunCommandTool::new().execute(serde_json::json!({"command": "pwd"}), &c).await;
        assert!(result.output.contains("subdir"));
    }

    #[tokio::test]
    async fn dry_run_does_not_execute() {
        let dir = TempDir::new().unwrap();
        let result = RunCommandTool::new()
            .execute(
                serde_json::json!({"command": "echo hi > marker.txt"}),
                &ctx(dir.path()).dry_run(),
            )
            .await;

        assert!(result.output.starts_with("[DRY-RUN]"));
        assert!(!dir.path().join("marker.txt").exists());
    }

    #[tokio::test]
    async fn timeout_reports_failure() {
        let dir = TempDir::new().unwrap();
        let result = RunCommandTool::new()
            .execute(
                serde_json::json!({"command": "sleep 5", "timeout_ms": 50}),
                &ctx(dir.path()),
            )
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("timed out"));
    }

    #[test]
    fn classifies_safe_commands() {
        assert_eq!(classify_command("ls -la"), CommandClass::Safe);
        assert_eq!(classify_command("git status"), CommandClass::Safe);
        assert_eq!(classify_command("pwd"), CommandClass::Safe);
    }

    #[test]
    fn classifies_dev_commands() {
        assert_eq!(classify_command("cargo test"), CommandClass::Dev);
        assert_eq!(classify_command("npm install"), CommandClass::Dev);
    }

    #[test]
    fn classifies_dangerous_commands() {
        assert_eq!(classify_command("rm -rf ./build"), CommandClass::Dangerous);
        assert_eq!(classify_command("docker system prune"), CommandClass::Dangerous);
    }

    #[test]
    fn redirection_targets_extracted() {
        let targets = redirection_targets("echo hi > out.txt 2>> err.log");
        assert_eq!(targets, vec!["out.txt", "err.log"]);
    }
}
