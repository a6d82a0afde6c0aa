//! `architect parallel` / `parallel-cleanup` (§6, §4.14): fan out tasks
//! across isolated git worktrees.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use architect_config::CliOverrides;
use architect_parallel::{cleanup_worktrees, AgentLoopFactory, ParallelRunner};
use architect_runtime::{AgentLoop, InterruptFlag};
use clap::Args;

use crate::builder::{build_agent_loop, RunOverrides};
use crate::exit_code;

#[derive(Args)]
pub struct ParallelArgs {
    /// Task prompt for one worker; repeatable.
    #[arg(long = "task")]
    pub tasks: Vec<String>,

    /// Maximum concurrent workers.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Comma-separated models, assigned round-robin across workers.
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Per-worker USD budget.
    #[arg(long)]
    pub budget_per_worker: Option<f64>,

    /// Per-worker wall-clock timeout, in seconds.
    #[arg(long)]
    pub timeout_per_worker: Option<u64>,
}

struct LoopFactory {
    config: architect_config::Config,
    overrides: RunOverrides,
    interrupt: InterruptFlag,
}

impl AgentLoopFactory<architect_llm::ClaudeProvider> for LoopFactory {
    fn build(&self, worktree_path: &Path, model: &str) -> Arc<AgentLoop<architect_llm::ClaudeProvider>> {
        let mut overrides = self.overrides.clone();
        overrides.model = Some(model.to_string());
        build_agent_loop(&self.config, worktree_path, &overrides, self.interrupt.clone(), true)
            .expect("building a worker's agent loop")
    }
}

pub async fn handle(
    args: ParallelArgs,
    workspace_root: &Path,
    config_path: &Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    let cli_overrides = CliOverrides { workspace_root: Some(workspace_root.to_path_buf()), ..Default::default() };
    let config = super::load_config(config_path, env, &cli_overrides)?;
    let default_model = config.llm.model.clone();

    let overrides = RunOverrides { max_cost_usd: args.budget_per_worker, timeout_secs: args.timeout_per_worker, ..Default::default() };
    let factory = Arc::new(LoopFactory { config, overrides, interrupt });

    let runner = ParallelRunner::new(workspace_root.to_path_buf(), args.workers, factory);
    let results = runner.run(args.tasks, &args.models, &default_model).await?;

    println!("{}", serde_json::to_string_pretty(&results)?);

    let any_failed = results.iter().any(|r| r.status == architect_parallel::WorkerStatus::Failed);
    Ok(if any_failed { exit_code::PARTIAL } else { exit_code::SUCCESS })
}

pub fn handle_cleanup(workspace_root: &Path) -> Result<i32> {
    let removed = cleanup_worktrees(workspace_root)?;
    eprintln!("removed {removed} leftover worktree(s)");
    Ok(exit_code::SUCCESS)
}
