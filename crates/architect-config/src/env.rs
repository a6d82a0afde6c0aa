//! Environment variable overrides (§6 precedence: file < env < CLI).
//!
//! A narrow, explicit set rather than a generic field-path mapping: only
//! the handful of values an operator plausibly needs to override without
//! editing the file (model, key source, workspace root, budget, log
//! level).

use std::collections::HashMap;
use std::path::PathBuf;

use crate::merge::{ConfigLayer, FieldSources};
use crate::types::Config;

pub fn apply_env_overrides(config: &mut Config, env: &HashMap<String, String>, sources: &mut FieldSources) {
    if let Some(value) = env.get("ARCHITECT_LLM_MODEL") {
        config.llm.model = value.clone();
        sources.insert("llm".to_string(), ConfigLayer::Env);
    }
    if let Some(value) = env.get("ARCHITECT_LLM_API_KEY_ENV") {
        config.llm.api_key_env = value.clone();
        sources.insert("llm".to_string(), ConfigLayer::Env);
    }
    if let Some(value) = env.get("ARCHITECT_LLM_BASE_URL") {
        config.llm.base_url = Some(value.clone());
        sources.insert("llm".to_string(), ConfigLayer::Env);
    }
    if let Some(value) = env.get("ARCHITECT_LOGGING_LEVEL") {
        config.logging.level = value.clone();
        sources.insert("logging".to_string(), ConfigLayer::Env);
    }
    if let Some(value) = env.get("ARCHITECT_WORKSPACE_ROOT") {
        config.workspace.root = Some(PathBuf::from(value));
        sources.insert("workspace".to_string(), ConfigLayer::Env);
    }
    if let Some(value) = env.get("ARCHITECT_COSTS_SESSION_BUDGET_USD") {
        if let Ok(budget) = value.parse::<f64>() {
            config.costs.session_budget_usd = Some(budget);
            sources.insert("costs".to_string(), ConfigLayer::Env);
        } else {
            tracing::warn!(value, "ARCHITECT_COSTS_SESSION_BUDGET_USD is not a valid number, ignoring");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_override_applies_and_is_tracked() {
        let mut config = Config::default();
        let mut sources = FieldSources::new();
        let env = HashMap::from([("ARCHITECT_LLM_MODEL".to_string(), "claude-haiku".to_string())]);
        apply_env_overrides(&mut config, &env, &mut sources);
        assert_eq!(config.llm.model, "claude-haiku");
        assert_eq!(sources.get("llm"), Some(&ConfigLayer::Env));
    }

    #[test]
    fn invalid_budget_is_ignored() {
        let mut config = Config::default();
        let mut sources = FieldSources::new();
        let env = HashMap::from([("ARCHITECT_COSTS_SESSION_BUDGET_USD".to_string(), "not-a-number".to_string())]);
        apply_env_overrides(&mut config, &env, &mut sources);
        assert_eq!(config.costs.session_budget_usd, None);
    }
}
