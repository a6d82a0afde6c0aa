//! Architect CLI: a thin client over the agent orchestration engines. Every
//! subcommand resolves configuration, builds whichever engine it needs
//! through [`builder`], and renders the result to stdout/stderr following
//! the streaming-to-stderr, result-to-stdout discipline.

#![deny(unsafe_code)]
#![warn(clippy::all)]

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod builder;
mod commands;
mod error;
mod exit_code;
mod output;
mod skills;

use architect_core::ConfirmMode;
use architect_runtime::InterruptFlag;

/// Architect - headless coding agent orchestration engine.
#[derive(Parser)]
#[command(name = "architect", author, version, about, long_about = None)]
struct Cli {
    /// Path to a config file, overriding the default `.architect/config.yaml`.
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root (defaults to the current directory).
    #[arg(short = 'w', long, global = true)]
    workspace: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot agent run.
    Run(commands::run::RunArgs),
    /// Iterative check-driven loop (Ralph Loop).
    Loop(commands::loop_cmd::LoopArgs),
    /// Run a YAML-defined multi-step pipeline.
    Pipeline(commands::pipeline::PipelineArgs),
    /// Fan a task list out across isolated worktrees.
    Parallel(commands::parallel::ParallelArgs),
    /// Remove leftover parallel-run worktrees.
    ParallelCleanup,
    /// Competitive multi-model evaluation.
    Eval(commands::eval::EvalArgs),
    /// Scaffold a new workspace from a preset.
    Init(commands::init::InitArgs),
    /// List saved sessions.
    Sessions,
    /// Resume a saved session by id (or `last`).
    Resume(commands::sessions::ResumeArgs),
    /// Delete sessions older than a threshold.
    Cleanup(commands::sessions::CleanupArgs),
    /// Show the resolved agent configuration.
    Agents,
    /// Validate a config file against the schema.
    ValidateConfig,
    /// Manage skills under `.architect/skills/`.
    Skill {
        #[command(subcommand)]
        command: commands::skill::SkillCommands,
    },
    /// Roll the workspace back to a checkpoint.
    Rollback(commands::checkpoint::RollbackArgs),
    /// List checkpoints created during past runs.
    History,
}

fn init_logging(level: Option<&str>, log_file: Option<&PathBuf>) {
    let level = level
        .map(str::to_string)
        .or_else(|| std::env::var("ARCHITECT_LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::try_new(&level).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = if let Some(path) = log_file {
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(level)).with_writer(file).try_init(),
            Err(e) => {
                eprintln!("failed to open log file {}: {e}", path.display());
                builder.try_init()
            }
        }
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}

/// Builds the env-override map `architect-config` expects, bridging the
/// user-facing `ARCHITECT_*` names (§6) onto the config crate's own
/// narrower per-section names.
fn config_env_overrides() -> HashMap<String, String> {
    let mut env = HashMap::new();
    if let Ok(model) = std::env::var("ARCHITECT_MODEL") {
        env.insert("ARCHITECT_LLM_MODEL".to_string(), model);
    }
    if let Ok(base) = std::env::var("ARCHITECT_API_BASE") {
        env.insert("ARCHITECT_LLM_BASE_URL".to_string(), base);
    }
    if let Ok(level) = std::env::var("ARCHITECT_LOG_LEVEL") {
        env.insert("ARCHITECT_LOGGING_LEVEL".to_string(), level);
    }
    if let Ok(workspace) = std::env::var("ARCHITECT_WORKSPACE") {
        env.insert("ARCHITECT_WORKSPACE_ROOT".to_string(), workspace);
    }
    env
}

/// Installs SIGINT/SIGTERM handling (§5): first delivery triggers the
/// shared [`InterruptFlag`] so the running loop closes gracefully; a
/// second SIGINT exits the process immediately with code 130.
fn spawn_interrupt_handler(flag: InterruptFlag) {
    tokio::spawn(async move {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        flag.trigger();
        tracing::warn!("interrupt received, stopping at the next safety check");

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("second interrupt received, exiting immediately");
            std::process::exit(exit_code::INTERRUPTED);
        }
    });
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref(), cli.log_file.as_ref());

    let workspace_root = cli.workspace.clone().unwrap_or_else(|| std::env::current_dir().expect("current directory"));
    let config_path = cli.config.clone().unwrap_or_else(|| workspace_root.join(".architect").join("config.yaml"));
    let env = config_env_overrides();

    let interrupt = InterruptFlag::new();
    spawn_interrupt_handler(interrupt.clone());

    let code = match run(cli.command, &workspace_root, &config_path, &env, interrupt).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            e.downcast_ref::<error::CliError>().map_or(exit_code::FAILED, error::CliError::exit_code)
        }
    };
    std::process::exit(code);
}

async fn run(
    command: Commands,
    workspace_root: &std::path::Path,
    config_path: &std::path::Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    match command {
        Commands::Run(args) => commands::run::handle(args, workspace_root, config_path, env, interrupt).await,
        Commands::Loop(args) => commands::loop_cmd::handle(args, workspace_root, config_path, env, interrupt).await,
        Commands::Pipeline(args) => commands::pipeline::handle(args, workspace_root, config_path, env, interrupt).await,
        Commands::Parallel(args) => commands::parallel::handle(args, workspace_root, config_path, env, interrupt).await,
        Commands::ParallelCleanup => commands::parallel::handle_cleanup(workspace_root),
        Commands::Eval(args) => commands::eval::handle(args, workspace_root, config_path, env, interrupt).await,
        Commands::Init(args) => commands::init::handle(args, workspace_root),
        Commands::Sessions => commands::sessions::handle_list(workspace_root),
        Commands::Resume(args) => commands::sessions::handle_resume(args, workspace_root, config_path, env, interrupt).await,
        Commands::Cleanup(args) => commands::sessions::handle_cleanup(args, workspace_root),
        Commands::Agents => commands::agents::handle(workspace_root, config_path, env),
        Commands::ValidateConfig => commands::config_cmd::handle_validate(config_path, env),
        Commands::Skill { command } => commands::skill::handle(command, workspace_root),
        Commands::Rollback(args) => commands::checkpoint::handle_rollback(args, workspace_root),
        Commands::History => commands::checkpoint::handle_history(workspace_root),
    }
}

/// Parses a `-m`/`--confirm-mode` flag value into a [`ConfirmMode`].
pub(crate) fn parse_confirm_mode(value: &str) -> std::result::Result<ConfirmMode, String> {
    match value {
        "yolo" => Ok(ConfirmMode::Yolo),
        "confirm-sensitive" => Ok(ConfirmMode::ConfirmSensitive),
        "confirm-all" => Ok(ConfirmMode::ConfirmAll),
        other => Err(format!("invalid confirm mode `{other}` (expected yolo, confirm-sensitive, or confirm-all)")),
    }
}
