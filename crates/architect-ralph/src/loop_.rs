//! The Ralph Loop driver (§4.12): repeatedly runs a fresh Agent Loop turn,
//! checks the result against external shell commands, and feeds failures
//! back into the next iteration's prompt until everything passes or a
//! limit is hit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use regex::Regex;
use tokio::process::Command;

use architect_llm::LlmProvider;
use architect_runtime::AgentLoop;

use crate::check::{run_check, CheckOutcome};
use crate::config::RalphConfig;
use crate::error::RalphResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RalphStopReason {
    ChecksPassed,
    CompletionTagMatched,
    MaxIterations,
    MaxCost,
    MaxTime,
}

#[derive(Debug, Clone)]
pub struct RalphOutcome {
    pub success: bool,
    pub iterations_run: usize,
    pub total_cost_usd: f64,
    pub stop_reason: RalphStopReason,
    pub last_checks: Vec<CheckOutcome>,
    pub last_output: String,
}

/// Drives one Ralph Loop run against a fixed workspace root. Worktree
/// isolation (§4.12) is the caller's responsibility: construct the
/// `AgentLoop` with a `ToolContext` already rooted at the worktree, and
/// pass that same path here as `workspace_root` so checks and `git diff`
/// run in the right place.
pub struct RalphLoop<P: LlmProvider> {
    agent_loop: Arc<AgentLoop<P>>,
    workspace_root: PathBuf,
    config: RalphConfig,
}

impl<P: LlmProvider> RalphLoop<P> {
    #[must_use]
    pub fn new(agent_loop: Arc<AgentLoop<P>>, workspace_root: PathBuf, config: RalphConfig) -> Self {
        Self { agent_loop, workspace_root, config }
    }

    pub async fn run(&self, task: &str) -> RalphResult<RalphOutcome> {
        let start = Instant::now();
        let base_commit = self.capture_base_commit().await;
        let completion_re = self
            .config
            .completion_tag
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        let progress_path = self.workspace_root.join(".architect").join("progress.md");
        let mut progress = tokio::fs::read_to_string(&progress_path).await.unwrap_or_default();
        let mut prior_errors: Vec<String> = Vec::new();
        let mut total_cost = 0.0;
        let mut iteration = 0usize;

        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                return Ok(self.stalled(iteration - 1, total_cost, RalphStopReason::MaxIterations));
            }
            if let Some(max_time) = self.config.max_time {
                if start.elapsed() >= max_time {
                    return Ok(self.stalled(iteration - 1, total_cost, RalphStopReason::MaxTime));
                }
            }
            if let Some(max_cost) = self.config.max_cost_usd {
                if total_cost >= max_cost {
                    return Ok(self.stalled(iteration - 1, total_cost, RalphStopReason::MaxCost));
                }
            }

            let diff = self.git_diff(base_commit.as_deref()).await;
            let prompt = self.build_prompt(task, &diff, &prior_errors, &progress);

            let outcome = self.agent_loop.run(prompt, "ralph", None).await?;
            total_cost += outcome.session.total_cost;
            let final_output = outcome.state.final_output.clone().unwrap_or_default();

            if let Some(re) = &completion_re {
                if re.is_match(&final_output) {
                    return Ok(RalphOutcome {
                        success: true,
                        iterations_run: iteration,
                        total_cost_usd: total_cost,
                        stop_reason: RalphStopReason::CompletionTagMatched,
                        last_checks: Vec::new(),
                        last_output: final_output,
                    });
                }
            }

            let mut checks = Vec::with_capacity(self.config.checks.len());
            for command in &self.config.checks {
                checks.push(run_check(command, &self.workspace_root, self.config.check_timeout).await);
            }
            let all_passed = checks.iter().all(|c| c.passed);

            self.append_progress(&mut progress, &progress_path, iteration, &checks, &final_output)
                .await?;

            if all_passed {
                return Ok(RalphOutcome {
                    success: true,
                    iterations_run: iteration,
                    total_cost_usd: total_cost,
                    stop_reason: RalphStopReason::ChecksPassed,
                    last_checks: checks,
                    last_output: final_output,
                });
            }

            prior_errors = checks
                .iter()
                .filter(|c| !c.passed)
                .map(|c| format!("{}: {}", c.command, c.output))
                .collect();
        }
    }

    fn stalled(&self, iterations_run: usize, total_cost_usd: f64, stop_reason: RalphStopReason) -> RalphOutcome {
        RalphOutcome {
            success: false,
            iterations_run,
            total_cost_usd,
            stop_reason,
            last_checks: Vec::new(),
            last_output: String::new(),
        }
    }

    fn build_prompt(&self, task: &str, diff: &str, prior_errors: &[String], progress: &str) -> String {
        let spec_content = self
            .config
            .spec_file
            .as_ref()
            .and_then(|path| std::fs::read_to_string(path).ok());
        render_prompt(task, spec_content.as_deref(), diff, prior_errors, progress)
    }

    async fn append_progress(
        &self,
        progress: &mut String,
        path: &PathBuf,
        iteration: usize,
        checks: &[CheckOutcome],
        final_output: &str,
    ) -> RalphResult<()> {
        let entry = render_progress_entry(iteration, checks, final_output);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        progress.push_str(&entry);
        tokio::fs::write(path, progress.as_str()).await?;
        Ok(())
    }

    async fn capture_base_commit(&self) -> Option<String> {
        let output = Command::new("git")
            .current_dir(&self.workspace_root)
            .args(["rev-parse", "HEAD"])
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn git_diff(&self, base: Option<&str>) -> String {
        let Some(base) = base else { return String::new() };
        match Command::new("git").current_dir(&self.workspace_root).args(["diff", base]).output().await {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout).into_owned(),
            _ => String::new(),
        }
    }
}

/// Assembles one iteration's clean prompt: task, spec file, current diff,
/// prior failures, and the accumulated progress log.
fn render_prompt(task: &str, spec: Option<&str>, diff: &str, prior_errors: &[String], progress: &str) -> String {
    let mut prompt = task.to_string();

    if let Some(spec) = spec {
        prompt.push_str("\n\n## Spec\n\n");
        prompt.push_str(spec);
    }
    if !diff.is_empty() {
        prompt.push_str("\n\n## Current diff\n\n```diff\n");
        prompt.push_str(diff);
        prompt.push_str("\n```\n");
    }
    if !prior_errors.is_empty() {
        prompt.push_str("\n\n## Errors from the previous iteration\n\n");
        for error in prior_errors {
            prompt.push_str(&format!("- {error}\n"));
        }
    }
    if !progress.is_empty() {
        prompt.push_str("\n\n## Progress so far\n\n");
        prompt.push_str(progress);
    }
    prompt
}

/// Renders one `.architect/progress.md` entry for an iteration.
fn render_progress_entry(iteration: usize, checks: &[CheckOutcome], final_output: &str) -> String {
    let status = if checks.is_empty() || checks.iter().all(|c| c.passed) { "passed" } else { "failed" };
    let mut entry = format!("\n## Iteration {iteration} ({status})\n\n{final_output}\n");
    if !checks.is_empty() {
        entry.push_str("\nChecks:\n");
        for check in checks {
            let mark = if check.passed { "pass" } else { "fail" };
            entry.push_str(&format!("- `{}`: {mark}\n", check.command));
        }
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_only_present_sections() {
        let bare = render_prompt("do the thing", None, "", &[], "");
        assert_eq!(bare, "do the thing");

        let full = render_prompt(
            "do the thing",
            Some("spec body"),
            "diff body",
            &["cargo test: failed".to_string()],
            "prior progress",
        );
        assert!(full.contains("## Spec\n\nspec body"));
        assert!(full.contains("```diff\ndiff body\n```"));
        assert!(full.contains("cargo test: failed"));
        assert!(full.contains("prior progress"));
    }

    #[test]
    fn progress_entry_reports_pass_fail_per_check() {
        let checks = vec![
            CheckOutcome { command: "cargo test".to_string(), passed: true, output: String::new() },
            CheckOutcome { command: "cargo clippy".to_string(), passed: false, output: "error".to_string() },
        ];
        let entry = render_progress_entry(3, &checks, "did stuff");
        assert!(entry.contains("Iteration 3 (failed)"));
        assert!(entry.contains("`cargo test`: pass"));
        assert!(entry.contains("`cargo clippy`: fail"));
    }

    #[test]
    fn progress_entry_with_no_checks_is_passed() {
        let entry = render_progress_entry(1, &[], "done");
        assert!(entry.contains("Iteration 1 (passed)"));
        assert!(!entry.contains("Checks:"));
    }
}
