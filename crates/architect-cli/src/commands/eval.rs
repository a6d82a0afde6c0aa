//! `architect eval` (§6): runs one task across several models in parallel
//! worktrees, then scores each candidate with a clean-context review
//! (§4.16) so the operator can see which model's diff is ready to merge.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use architect_config::CliOverrides;
use architect_core::ConfirmMode;
use architect_parallel::{AgentLoopFactory, ParallelRunner, WorkerStatus};
use architect_review::{review, REVIEW_INSTRUCTIONS};
use architect_runtime::InterruptFlag;
use clap::Args;
use serde::Serialize;

use crate::builder::{build_agent_loop, RunOverrides};
use crate::exit_code;

#[derive(Args)]
pub struct EvalArgs {
    /// Task prompt every candidate model attempts.
    pub prompt: String,

    /// Comma-separated candidate models.
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,
}

#[derive(Serialize)]
struct EvalCandidate {
    model: String,
    status: WorkerStatus,
    cost: f64,
    has_issues: bool,
    review: String,
}

struct EvalFactory {
    config: architect_config::Config,
    interrupt: InterruptFlag,
}

impl AgentLoopFactory<architect_llm::ClaudeProvider> for EvalFactory {
    fn build(&self, worktree_path: &Path, model: &str) -> Arc<architect_runtime::AgentLoop<architect_llm::ClaudeProvider>> {
        let overrides = RunOverrides { model: Some(model.to_string()), confirm_mode: Some(ConfirmMode::Yolo), ..Default::default() };
        build_agent_loop(&self.config, worktree_path, &overrides, self.interrupt.clone(), true).expect("building a candidate's agent loop")
    }
}

pub async fn handle(
    args: EvalArgs,
    workspace_root: &Path,
    config_path: &Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    if args.models.is_empty() {
        anyhow::bail!("eval requires at least one --models entry");
    }

    let cli_overrides = CliOverrides { workspace_root: Some(workspace_root.to_path_buf()), ..Default::default() };
    let config = super::load_config(config_path, env, &cli_overrides)?;

    let factory = Arc::new(EvalFactory { config: config.clone(), interrupt: interrupt.clone() });
    let worker_count = args.models.len();
    let runner = ParallelRunner::new(workspace_root.to_path_buf(), worker_count, factory);

    let tasks = vec![args.prompt.clone(); args.models.len()];
    let worker_results = runner.run(tasks, &args.models, &args.models[0]).await.context("running eval candidates")?;

    let mut reviewer_overrides = RunOverrides {
        confirm_mode: Some(ConfirmMode::Yolo),
        allowed_tools: Some(vec!["read_file".to_string(), "list_directory".to_string(), "grep".to_string(), "glob".to_string()]),
        system_prompt: Some(format!("{}\n\n{}", default_review_system_prompt(), REVIEW_INSTRUCTIONS)),
        ..Default::default()
    };
    reviewer_overrides.model = Some(config.llm.model.clone());
    let reviewer_loop = build_agent_loop(&config, workspace_root, &reviewer_overrides, interrupt, true)?;

    let mut candidates = Vec::with_capacity(worker_results.len());
    for worker in &worker_results {
        let diff = worktree_diff(&worker.worktree_path).await.unwrap_or_default();
        let verdict = if worker.status == WorkerStatus::Success {
            review(&reviewer_loop, &args.prompt, &diff).await.ok()
        } else {
            None
        };
        candidates.push(EvalCandidate {
            model: worker.model.clone(),
            status: worker.status,
            cost: worker.cost,
            has_issues: verdict.as_ref().map_or(true, |v| v.has_issues),
            review: verdict.map(|v| v.review_text).unwrap_or_default(),
        });
    }

    candidates.sort_by(rank_candidates);

    println!("{}", serde_json::to_string_pretty(&candidates)?);

    Ok(if candidates.first().is_some_and(|c| !c.has_issues) { exit_code::SUCCESS } else { exit_code::PARTIAL })
}

async fn worktree_diff(worktree_path: &Path) -> Option<String> {
    let output = tokio::process::Command::new("git").current_dir(worktree_path).args(["diff", "HEAD"]).output().await.ok()?;
    output.status.success().then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

fn default_review_system_prompt() -> String {
    "You are a read-only code reviewer.".to_string()
}

/// Clean candidates (no review issues) sort before dirty ones; ties break
/// by cost, cheapest first.
fn rank_candidates(a: &EvalCandidate, b: &EvalCandidate) -> std::cmp::Ordering {
    a.has_issues.cmp(&b.has_issues).then(a.cost.partial_cmp(&b.cost).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(model: &str, has_issues: bool, cost: f64) -> EvalCandidate {
        EvalCandidate { model: model.to_string(), status: WorkerStatus::Success, cost, has_issues, review: String::new() }
    }

    #[test]
    fn clean_candidates_rank_before_dirty_ones() {
        let mut candidates = vec![candidate("expensive-clean", false, 5.0), candidate("cheap-dirty", true, 0.1)];
        candidates.sort_by(rank_candidates);
        assert_eq!(candidates[0].model, "expensive-clean");
    }

    #[test]
    fn ties_break_by_cost() {
        let mut candidates = vec![candidate("pricey", false, 2.0), candidate("cheap", false, 0.5)];
        candidates.sort_by(rank_candidates);
        assert_eq!(candidates[0].model, "cheap");
    }
}
