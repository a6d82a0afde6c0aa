//! `architect loop` (§6, §4.12): iterative check-driven Ralph Loop.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use architect_config::CliOverrides;
use architect_ralph::{RalphConfig, RalphLoop, RalphStopReason};
use architect_runtime::InterruptFlag;
use clap::Args;
use colored::Colorize;

use crate::builder::{build_agent_loop, RunOverrides};
use crate::exit_code;

#[derive(Args)]
pub struct LoopArgs {
    /// Task prompt for the first iteration.
    pub prompt: String,

    /// Shell command that must succeed for the loop to stop; repeatable.
    #[arg(long = "check")]
    pub checks: Vec<String>,

    /// File whose content is folded into every iteration's prompt.
    #[arg(long)]
    pub spec: Option<std::path::PathBuf>,

    /// Hard cap on iterations.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Hard cap on accumulated cost across all iterations.
    #[arg(long)]
    pub max_cost: Option<f64>,

    /// Hard cap on wall-clock time, in seconds.
    #[arg(long)]
    pub max_time: Option<u64>,

    /// Run inside a fresh git worktree rather than the current workspace.
    #[arg(long)]
    pub worktree: bool,

    /// Regex: accept early if the final output matches, skipping checks.
    #[arg(long)]
    pub completion_tag: Option<String>,

    /// Named agent profile (reserved).
    #[arg(short = 'a', long)]
    pub agent: Option<String>,

    /// Override the configured model.
    #[arg(long)]
    pub model: Option<String>,
}

pub async fn handle(
    args: LoopArgs,
    workspace_root: &Path,
    config_path: &Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    let cli_overrides = CliOverrides {
        model: args.model.clone(),
        workspace_root: Some(workspace_root.to_path_buf()),
        max_cost_usd: args.max_cost,
        ..Default::default()
    };
    let config = super::load_config(config_path, env, &cli_overrides)?;

    let (run_root, _worktree) = if args.worktree {
        let worktree = architect_parallel::WorkerWorktree::create(workspace_root, 0).context("creating loop worktree")?;
        let path = worktree.path.clone();
        (path, Some(worktree))
    } else {
        (workspace_root.to_path_buf(), None)
    };

    let overrides = RunOverrides { model: args.model.clone(), max_cost_usd: args.max_cost, ..Default::default() };
    let agent_loop = build_agent_loop(&config, &run_root, &overrides, interrupt, false)?;

    let ralph_config = RalphConfig {
        checks: args.checks,
        spec_file: args.spec,
        max_iterations: args.max_iterations.unwrap_or(25),
        max_cost_usd: args.max_cost,
        max_time: args.max_time.map(std::time::Duration::from_secs),
        completion_tag: args.completion_tag,
        check_timeout: std::time::Duration::from_secs(30),
    };

    let ralph = RalphLoop::new(agent_loop, run_root, ralph_config);
    let outcome = ralph.run(&args.prompt).await?;

    eprintln!(
        "{}",
        format!(
            "ralph loop finished after {} iteration(s), stop reason {:?}, cost ${:.4}",
            outcome.iterations_run, outcome.stop_reason, outcome.total_cost_usd
        )
        .dimmed()
    );
    println!("{}", outcome.last_output);

    Ok(if outcome.success {
        exit_code::SUCCESS
    } else {
        match outcome.stop_reason {
            RalphStopReason::MaxTime => exit_code::TIMEOUT,
            _ => exit_code::PARTIAL,
        }
    })
}
