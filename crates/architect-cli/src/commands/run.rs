//! `architect run <prompt>` (§6): one-shot agent run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use architect_config::CliOverrides;
use architect_core::{AgentStatus, ConfirmMode};
use architect_index::IndexCache;
use architect_report::{ReportData, ReportFormat};
use architect_runtime::InterruptFlag;
use clap::Args;
use colored::Colorize;

use crate::builder::{build_agent_loop, RunOverrides};
use crate::{exit_code, output};

#[derive(Args)]
pub struct RunArgs {
    /// Task prompt for the agent.
    pub prompt: String,

    /// Named agent profile (reserved; a single profile is supported today).
    #[arg(short = 'a', long)]
    pub agent: Option<String>,

    /// Override `agents.default_confirm_mode`.
    #[arg(short = 'm', long = "confirm-mode", value_parser = crate::parse_confirm_mode)]
    pub confirm_mode: Option<ConfirmMode>,

    /// Record planned writes instead of executing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Override the configured model.
    #[arg(long)]
    pub model: Option<String>,

    /// Override the LLM API base URL.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Override the API key (overrides the env-var lookup entirely).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Per-run wall-clock timeout, in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Per-run USD budget.
    #[arg(long)]
    pub budget: Option<f64>,

    /// Print the cost summary to stderr after the run.
    #[arg(long)]
    pub show_costs: bool,

    /// Override `agents.max_steps`.
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Emit the JSON result shape (§6) to stdout instead of plain text.
    #[arg(long)]
    pub json: bool,

    /// Suppress progress banners and auto-accept confirmations.
    #[arg(short, long)]
    pub quiet: bool,

    /// Render a report in the given format in addition to the plain result.
    #[arg(long, value_enum)]
    pub report: Option<ReportKind>,

    /// Write the rendered report to this file instead of stdout.
    #[arg(long)]
    pub report_file: Option<PathBuf>,

    /// Fold `git diff <ref>` into the run's extra system context.
    #[arg(long)]
    pub context_git_diff: Option<String>,

    /// Exit code to use when the run finishes `partial`, overriding the default 2.
    #[arg(long)]
    pub exit_code_on_partial: Option<i32>,

    /// Resume a previously saved session id.
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum ReportKind {
    Json,
    Markdown,
    Github,
}

impl From<ReportKind> for ReportFormat {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Json => ReportFormat::Json,
            ReportKind::Markdown => ReportFormat::Markdown,
            ReportKind::Github => ReportFormat::Github,
        }
    }
}

pub async fn handle(
    args: RunArgs,
    workspace_root: &Path,
    config_path: &Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    let cli_overrides = CliOverrides {
        model: args.model.clone(),
        confirm_mode: args.confirm_mode,
        workspace_root: Some(workspace_root.to_path_buf()),
        max_cost_usd: args.budget,
        log_level: None,
    };
    let config = super::load_config(config_path, env, &cli_overrides)?;

    if let Some(api_key) = &args.api_key {
        std::env::set_var(&config.llm.api_key_env, api_key);
    }

    let overrides = RunOverrides {
        model: args.model.clone(),
        confirm_mode: args.confirm_mode,
        max_cost_usd: args.budget,
        max_steps: args.max_steps,
        timeout_secs: args.timeout,
        dry_run: args.dry_run,
        allowed_tools: None,
        system_prompt: None,
        parallel_tools_disabled: false,
    };

    let mut config = config;
    if let Some(base) = &args.api_base {
        config.llm.base_url = Some(base.clone());
    }

    let agent_loop = build_agent_loop(&config, workspace_root, &overrides, interrupt, args.quiet)?;

    let extra_context = build_extra_context(workspace_root, args.context_git_diff.as_deref()).await;

    if !args.quiet {
        eprintln!("{}", format!("running: {}", args.prompt).dimmed());
    }

    let start = std::time::Instant::now();
    let outcome = agent_loop.run(args.prompt.clone(), args.agent.as_deref().unwrap_or("default"), extra_context.as_deref()).await?;
    let duration = start.elapsed().as_secs_f64();

    let cost_tracker = agent_loop.cost_tracker.lock().await;
    let report = ReportData::from_run(&outcome.state, Some(&cost_tracker), &config.llm.model, duration);
    drop(cost_tracker);

    if args.show_costs {
        if let Some(costs) = &report.costs {
            eprintln!("{}", format!("cost: ${:.4} ({} in / {} out tokens)", costs.total_cost_usd, costs.total_input_tokens, costs.total_output_tokens).dimmed());
        }
    }

    if let Some(kind) = args.report {
        let rendered = report.render(kind.into()).context("rendering report")?;
        match &args.report_file {
            Some(path) => std::fs::write(path, &rendered).with_context(|| format!("writing report to {}", path.display()))?,
            None => println!("{rendered}"),
        }
    } else if args.json {
        println!("{}", report.to_json().context("serializing JSON report")?);
    } else {
        output::print_result(&report.output);
    }

    if !args.quiet && report.status != AgentStatus::Success {
        eprintln!("{}", output::status_summary(&report).yellow());
    }

    Ok(exit_code::from_run(report.status, report.stop_reason, &report.output, args.exit_code_on_partial))
}

/// Assembles the extra system context (§4.11): a repo index summary plus,
/// when requested, a git diff against `ref_name`.
async fn build_extra_context(workspace_root: &Path, ref_name: Option<&str>) -> Option<String> {
    let mut sections = Vec::new();

    let cache = IndexCache::for_workspace(workspace_root);
    if let Ok(index) = cache.get_or_build(workspace_root).await {
        sections.push(format!("# Repository overview\n{}", index.tree_summary));
    }

    if let Some(ref_name) = ref_name {
        let diff = tokio::process::Command::new("git")
            .current_dir(workspace_root)
            .args(["diff", ref_name])
            .output()
            .await
            .ok()
            .filter(|o| o.status.success())
            .map(|o| String::from_utf8_lossy(&o.stdout).into_owned());
        if let Some(diff) = diff.filter(|d| !d.is_empty()) {
            sections.push(format!("# Diff against {ref_name}\n{diff}"));
        }
    }

    if sections.is_empty() { None } else { Some(sections.join("\n\n")) }
}
