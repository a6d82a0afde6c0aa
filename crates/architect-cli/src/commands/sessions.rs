//! `architect sessions` / `resume <id>` / `cleanup` (§6): session management.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use architect_config::CliOverrides;
use architect_runtime::{resolve_session_id, InterruptFlag, SessionStore};
use clap::Args;
use colored::Colorize;

use crate::builder::{build_agent_loop, RunOverrides};
use crate::exit_code;

fn session_store(workspace_root: &Path) -> SessionStore {
    SessionStore::new(workspace_root.join(".architect").join("sessions"))
}

pub fn handle_list(workspace_root: &Path) -> Result<i32> {
    let store = session_store(workspace_root);
    let ids = store.list().context("listing sessions")?;
    if ids.is_empty() {
        eprintln!("{}", "no saved sessions".dimmed());
    }
    for id in &ids {
        if let Some(session) = store.load(id)? {
            println!("{id}  {}  ${:.4}  {}", session.model, session.total_cost, session.task);
        } else {
            println!("{id}");
        }
    }
    Ok(exit_code::SUCCESS)
}

#[derive(Args)]
pub struct ResumeArgs {
    /// Session id, or `last` for the most recently saved session.
    pub id: String,

    /// Follow-up prompt for the resumed session (defaults to the original task).
    pub prompt: Option<String>,
}

pub async fn handle_resume(
    args: ResumeArgs,
    workspace_root: &Path,
    config_path: &Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    let store = session_store(workspace_root);
    let session = if args.id == "last" {
        store.most_recent().context("loading most recent session")?.context("no saved sessions to resume")?
    } else {
        let id = resolve_session_id(&args.id)?;
        store.load(&id).context("loading session")?.with_context(|| format!("no session found with id {id}"))?
    };

    let cli_overrides = CliOverrides {
        model: Some(session.model.clone()),
        workspace_root: Some(workspace_root.to_path_buf()),
        ..Default::default()
    };
    let config = super::load_config(config_path, env, &cli_overrides)?;

    let overrides = RunOverrides { model: Some(session.model.clone()), ..Default::default() };
    let agent_loop = build_agent_loop(&config, workspace_root, &overrides, interrupt, false)?;

    let task = args.prompt.unwrap_or_else(|| session.task.clone());
    eprintln!("{}", format!("resuming session {} ({})", session.session_id, session.model).dimmed());
    let outcome = agent_loop.run(task, "default", None).await?;

    let output = outcome.state.final_output.clone().unwrap_or_default();
    println!("{output}");
    Ok(crate::exit_code::from_run(outcome.state.status, outcome.state.stop_reason, &output, None))
}

#[derive(Args)]
pub struct CleanupArgs {
    /// Delete sessions last modified more than this many days ago.
    #[arg(long, default_value_t = 30)]
    pub older_than: u64,
}

pub fn handle_cleanup(args: CleanupArgs, workspace_root: &Path) -> Result<i32> {
    let store = session_store(workspace_root);
    let removed = store.cleanup_old(args.older_than).context("cleaning up old sessions")?;
    eprintln!("removed {removed} session(s) older than {} day(s)", args.older_than);
    Ok(exit_code::SUCCESS)
}
