//! `architect rollback` / `history` (§6, §4.15): checkpoint operations.

use std::path::Path;

use anyhow::Result;
use architect_checkpoint::CheckpointManager;
use clap::Args;
use colored::Colorize;

use crate::exit_code;

#[derive(Args)]
pub struct RollbackArgs {
    /// Checkpoint to roll back to: a step name (most recent match wins) or
    /// a literal commit id.
    pub target: String,
}

pub fn handle_rollback(args: RollbackArgs, workspace_root: &Path) -> Result<i32> {
    let manager = CheckpointManager::new(workspace_root);
    manager.rollback(&args.target)?;
    println!("{}", format!("rolled back to {}", args.target).green());
    Ok(exit_code::SUCCESS)
}

pub fn handle_history(workspace_root: &Path) -> Result<i32> {
    let manager = CheckpointManager::new(workspace_root);
    let checkpoints = manager.list()?;
    if checkpoints.is_empty() {
        eprintln!("{}", "no checkpoints recorded".dimmed());
        return Ok(exit_code::SUCCESS);
    }
    for checkpoint in checkpoints {
        println!("{}  {}  {}  {}", checkpoint.commit_id, checkpoint.timestamp, checkpoint.step_name, checkpoint.message);
    }
    Ok(exit_code::SUCCESS)
}
