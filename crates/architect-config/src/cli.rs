//! CLI flag overrides (§6 precedence: highest). A plain struct of
//! `Option`s the `architect-cli` binary populates from parsed `clap` args.

use std::path::PathBuf;

use architect_core::ConfirmMode;

use crate::merge::{ConfigLayer, FieldSources};
use crate::types::Config;

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub confirm_mode: Option<ConfirmMode>,
    pub workspace_root: Option<PathBuf>,
    pub max_cost_usd: Option<f64>,
    pub log_level: Option<String>,
}

pub fn apply_cli_overrides(config: &mut Config, overrides: &CliOverrides, sources: &mut FieldSources) {
    if let Some(model) = &overrides.model {
        config.llm.model = model.clone();
        sources.insert("llm".to_string(), ConfigLayer::Cli);
    }
    if let Some(mode) = overrides.confirm_mode {
        config.agents.default_confirm_mode = mode;
        sources.insert("agents".to_string(), ConfigLayer::Cli);
    }
    if let Some(root) = &overrides.workspace_root {
        config.workspace.root = Some(root.clone());
        sources.insert("workspace".to_string(), ConfigLayer::Cli);
    }
    if let Some(budget) = overrides.max_cost_usd {
        config.agents.max_cost_usd = Some(budget);
        sources.insert("agents".to_string(), ConfigLayer::Cli);
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
        sources.insert("logging".to_string(), ConfigLayer::Cli);
    }
}
