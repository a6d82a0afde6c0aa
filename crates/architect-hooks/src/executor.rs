//! Runs hooks as subprocesses and interprets their exit codes.

use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::context::HookContext;
use crate::hook::Hook;
use crate::result::{HookExecution, HookOutcome};

/// Runs hooks against a [`HookContext`].
#[derive(Debug, Default)]
pub struct HookExecutor;

impl HookExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether `hook` applies to `context` (enabled, event, matcher,
    /// file_patterns).
    #[must_use]
    pub fn matches(hook: &Hook, context: &HookContext) -> bool {
        if !hook.enabled || hook.event != context.event {
            return false;
        }

        if let Some(ref pattern) = hook.matcher
            && let Ok(re) = Regex::new(pattern)
            && !re.is_match(&context.match_subject())
        {
            return false;
        }

        if !hook.file_patterns.is_empty() {
            let Some(ref file_path) = context.file_path else {
                return false;
            };
            let matched = hook.file_patterns.iter().any(|pattern| {
                globset::Glob::new(pattern)
                    .ok()
                    .is_some_and(|g| g.compile_matcher().is_match(file_path))
            });
            if !matched {
                return false;
            }
        }

        true
    }

    /// Run a single hook. Async hooks are spawned and not awaited, always
    /// reporting [`HookOutcome::Allow`] with `fired_and_forgotten = true`.
    pub async fn execute(&self, hook: &Hook, context: &HookContext) -> HookExecution {
        let command = hook
            .command
            .replace("{file}", context.file_path.as_deref().unwrap_or(""));

        if hook.is_async {
            let timeout = Duration::from_secs(hook.timeout_seconds);
            let payload = context.to_payload();
            let env_vars = context.to_env_vars();
            tokio::spawn(async move {
                let _ = tokio::time::timeout(timeout, run(&command, &payload, &env_vars)).await;
            });
            return HookExecution {
                hook_name: hook.name.clone(),
                outcome: HookOutcome::Allow,
                extra_context: None,
                duration_ms: 0,
                fired_and_forgotten: true,
            };
        }

        let start = std::time::Instant::now();
        let payload = context.to_payload();
        let env_vars = context.to_env_vars();
        let timeout = Duration::from_secs(hook.timeout_seconds);

        let (outcome, extra_context) =
            match tokio::time::timeout(timeout, run(&command, &payload, &env_vars)).await {
                Ok(Ok((exit_code, stdout, stderr))) => interpret(exit_code, &stdout, &stderr, &hook.name),
                Ok(Err(e)) => {
                    tracing::warn!(hook = %hook.name, error = %e, "hook failed to launch, treating as allow");
                    (HookOutcome::Allow, None)
                }
                Err(_) => {
                    tracing::warn!(hook = %hook.name, "hook timed out, treating as allow");
                    (HookOutcome::Allow, None)
                }
            };

        HookExecution {
            hook_name: hook.name.clone(),
            outcome,
            extra_context,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            fired_and_forgotten: false,
        }
    }

    /// Run every matching hook in order, stopping at the first `Block`.
    pub async fn execute_all(&self, hooks: &[Hook], context: &HookContext) -> Vec<HookExecution> {
        let mut executions = Vec::new();
        for hook in hooks.iter().filter(|h| Self::matches(h, context)) {
            let execution = self.execute(hook, context).await;
            let blocked = execution.is_blocking();
            executions.push(execution);
            if blocked {
                break;
            }
        }
        executions
    }
}

/// Interpret a hook's exit code and stdout per §4.5's protocol. Returns the
/// outcome and, when applicable, stdout to attach as extra context.
fn interpret(exit_code: i32, stdout: &str, stderr: &str, hook_name: &str) -> (HookOutcome, Option<String>) {
    match exit_code {
        0 => {
            if let Ok(parsed) = serde_json::from_str::<Value>(stdout.trim())
                && let Some(modified_input) = parsed.get("modified_input")
            {
                return (HookOutcome::Modify { modified_input: modified_input.clone() }, None);
            }
            let trimmed = stdout.trim();
            let extra = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
            (HookOutcome::Allow, extra)
        }
        2 => {
            let reason = if stderr.trim().is_empty() { stdout.trim() } else { stderr.trim() };
            (HookOutcome::Block { reason: reason.to_string() }, None)
        }
        other => {
            tracing::warn!(hook = %hook_name, exit_code = other, "hook exited nonzero, treating as allow");
            let trimmed = stdout.trim();
            let extra = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
            (HookOutcome::Allow, extra)
        }
    }
}

/// Spawn `command` via `sh -c`, writing `payload` to stdin and setting
/// `env_vars`, returning `(exit_code, stdout, stderr)`.
async fn run(
    command: &str,
    payload: &Value,
    env_vars: &[(String, String)],
) -> std::io::Result<(i32, String, String)> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .envs(env_vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        let payload_bytes = serde_json::to_vec(payload).unwrap_or_default();
        let _ = stdin.write_all(&payload_bytes).await;
    }

    let output = child.wait_with_output().await?;
    Ok((
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HookEvent;

    #[tokio::test]
    async fn allow_on_exit_zero() {
        let executor = HookExecutor::new();
        let hook = Hook::new("noop", "exit 0", HookEvent::PreToolUse);
        let context = HookContext::new(HookEvent::PreToolUse);
        let execution = executor.execute(&hook, &context).await;
        assert_eq!(execution.outcome, HookOutcome::Allow);
    }

    #[tokio::test]
    async fn block_on_exit_two() {
        let executor = HookExecutor::new();
        let hook = Hook::new("deny", "echo 'no' >&2; exit 2", HookEvent::PreToolUse);
        let context = HookContext::new(HookEvent::PreToolUse);
        let execution = executor.execute(&hook, &context).await;
        assert!(matches!(execution.outcome, HookOutcome::Block { .. }));
    }

    #[tokio::test]
    async fn other_nonzero_is_treated_as_allow() {
        let executor = HookExecutor::new();
        let hook = Hook::new("flaky", "exit 1", HookEvent::PreToolUse);
        let context = HookContext::new(HookEvent::PreToolUse);
        let execution = executor.execute(&hook, &context).await;
        assert_eq!(execution.outcome, HookOutcome::Allow);
    }

    #[tokio::test]
    async fn modify_input_parsed_from_stdout() {
        let executor = HookExecutor::new();
        let hook = Hook::new(
            "rewrite",
            r#"echo '{"modified_input": {"file_path": "b.txt"}}'"#,
            HookEvent::PreToolUse,
        );
        let context = HookContext::new(HookEvent::PreToolUse);
        let execution = executor.execute(&hook, &context).await;
        match execution.outcome {
            HookOutcome::Modify { modified_input } => {
                assert_eq!(modified_input["file_path"], "b.txt");
            }
            other => panic!("expected Modify, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_hook_does_not_match() {
        let hook = Hook::new("noop", "exit 0", HookEvent::PreToolUse).disabled();
        let context = HookContext::new(HookEvent::PreToolUse);
        assert!(!HookExecutor::matches(&hook, &context));
    }

    #[tokio::test]
    async fn matcher_filters_by_tool_name() {
        let hook = Hook::new("fmt", "exit 0", HookEvent::PostToolUse).with_matcher("^write_file$");
        let matching = HookContext::new(HookEvent::PostToolUse).with_tool_name("write_file");
        let non_matching = HookContext::new(HookEvent::PostToolUse).with_tool_name("read_file");

        assert!(HookExecutor::matches(&hook, &matching));
        assert!(!HookExecutor::matches(&hook, &non_matching));
    }

    #[tokio::test]
    async fn file_placeholder_is_substituted() {
        let executor = HookExecutor::new();
        let hook = Hook::new("echo_file", "echo {file}", HookEvent::PostToolUse);
        let context = HookContext::new(HookEvent::PostToolUse).with_file_path("src/main.rs");
        let execution = executor.execute(&hook, &context).await;
        assert_eq!(execution.outcome, HookOutcome::Allow);
    }

    #[tokio::test]
    async fn post_tool_use_hook_sees_tool_result_in_stdin_payload() {
        let executor = HookExecutor::new();
        let hook = Hook::new(
            "check_result",
            r#"grep -q '"success":true' && exit 0 || exit 2"#,
            HookEvent::PostToolUse,
        );
        let context = HookContext::new(HookEvent::PostToolUse)
            .with_tool_result(architect_core::ToolResult::ok("wrote file"));
        let execution = executor.execute(&hook, &context).await;
        assert_eq!(execution.outcome, HookOutcome::Allow);
    }

    #[tokio::test]
    async fn execute_all_stops_at_first_block() {
        let executor = HookExecutor::new();
        let hooks = vec![
            Hook::new("deny", "exit 2", HookEvent::PreToolUse),
            Hook::new("never_runs", "exit 0", HookEvent::PreToolUse),
        ];
        let context = HookContext::new(HookEvent::PreToolUse);
        let executions = executor.execute_all(&hooks, &context).await;
        assert_eq!(executions.len(), 1);
        assert!(executions[0].is_blocking());
    }
}
