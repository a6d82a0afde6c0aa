//! `architect pipeline` (§6, §4.13): run a YAML-defined multi-step workflow.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use architect_checkpoint::CheckpointManager;
use architect_config::CliOverrides;
use architect_pipeline::{plan, PipelineDef, PipelineRunner};
use architect_runtime::InterruptFlag;
use clap::Args;
use colored::Colorize;

use crate::builder::{build_agent_loop, RunOverrides};
use crate::exit_code;

#[derive(Args)]
pub struct PipelineArgs {
    /// Path to the pipeline YAML definition.
    #[arg(long = "config")]
    pub config: std::path::PathBuf,

    /// Seed variable as `key=value`; repeatable.
    #[arg(long = "var")]
    pub vars: Vec<String>,

    /// Resume from this step name instead of the first.
    #[arg(long)]
    pub from_step: Option<String>,

    /// Print the resolved step prompts without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle(
    args: PipelineArgs,
    workspace_root: &Path,
    config_path: &Path,
    env: &HashMap<String, String>,
    interrupt: InterruptFlag,
) -> Result<i32> {
    let source = std::fs::read_to_string(&args.config).with_context(|| format!("reading pipeline definition {}", args.config.display()))?;
    let def = PipelineDef::from_yaml(&source).context("parsing pipeline YAML")?;

    if args.dry_run {
        println!("{}", plan(&def, args.from_step.as_deref())?);
        return Ok(exit_code::SUCCESS);
    }

    let initial_vars = parse_vars(&args.vars)?;

    let cli_overrides = CliOverrides { workspace_root: Some(workspace_root.to_path_buf()), ..Default::default() };
    let config = super::load_config(config_path, env, &cli_overrides)?;

    let mut models: Vec<String> = def.steps.iter().filter_map(|step| step.model.clone()).collect();
    models.push(config.llm.model.clone());
    models.sort();
    models.dedup();

    let mut agent_loops = HashMap::new();
    for model in models {
        let overrides = RunOverrides { model: Some(model.clone()), ..Default::default() };
        let agent_loop = build_agent_loop(&config, workspace_root, &overrides, interrupt.clone(), false)?;
        agent_loops.insert(model, agent_loop);
    }

    let checkpoint = CheckpointManager::new(workspace_root);
    let runner = PipelineRunner::new(agent_loops, config.llm.model.clone(), workspace_root.to_path_buf(), Some(checkpoint));

    let outcome = runner.run(&def, initial_vars, args.from_step.as_deref()).await?;

    for step in &outcome.steps {
        eprintln!("{}", format!("[{}] {:?} (${:.4})", step.name, step.status, step.cost_usd).dimmed());
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(if outcome.completed { exit_code::SUCCESS } else { exit_code::PARTIAL })
}

fn parse_vars(raw: &[String]) -> Result<BTreeMap<String, serde_json::Value>> {
    let mut vars = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry.split_once('=').with_context(|| format!("--var {entry:?} must be key=value"))?;
        vars.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs() {
        let vars = parse_vars(&["target=main".to_string(), "retries=3".to_string()]).unwrap();
        assert_eq!(vars.get("target"), Some(&serde_json::Value::String("main".to_string())));
        assert_eq!(vars.get("retries"), Some(&serde_json::Value::String("3".to_string())));
    }

    #[test]
    fn value_may_contain_equals_signs() {
        let vars = parse_vars(&["url=https://example.com/x=y".to_string()]).unwrap();
        assert_eq!(vars.get("url"), Some(&serde_json::Value::String("https://example.com/x=y".to_string())));
    }

    #[test]
    fn rejects_entries_without_equals() {
        assert!(parse_vars(&["nokeyvalue".to_string()]).is_err());
    }
}
