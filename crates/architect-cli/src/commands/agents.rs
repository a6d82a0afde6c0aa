//! `architect agents` (§6): show the resolved agent configuration.
//!
//! A single profile is supported today (no named multi-agent registry), so
//! this prints the configuration that every `run`/`loop`/`pipeline`/
//! `parallel` invocation builds its `AgentLoop` from.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use architect_config::CliOverrides;
use serde::Serialize;

use crate::exit_code;

#[derive(Serialize)]
struct AgentSummary {
    name: &'static str,
    model: String,
    confirm_mode: architect_core::ConfirmMode,
    max_steps: u32,
    max_cost_usd: Option<f64>,
    parallel_tools: bool,
}

pub fn handle(workspace_root: &Path, config_path: &Path, env: &HashMap<String, String>) -> Result<i32> {
    let cli_overrides = CliOverrides { workspace_root: Some(workspace_root.to_path_buf()), ..Default::default() };
    let config = super::load_config(config_path, env, &cli_overrides)?;

    let summary = AgentSummary {
        name: "default",
        model: config.llm.model,
        confirm_mode: config.agents.default_confirm_mode,
        max_steps: config.agents.max_steps,
        max_cost_usd: config.agents.max_cost_usd,
        parallel_tools: config.agents.parallel_tools,
    };
    println!("{}", serde_json::to_string_pretty(&[summary])?);
    Ok(exit_code::SUCCESS)
}
