//! Post-merge configuration validation (§6): one function per section,
//! returning the first violation found.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_llm(config)?;
    validate_agents(config)?;
    validate_context(config)?;
    validate_costs(config)?;
    validate_health(config)?;
    Ok(())
}

fn err(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(format!("{field}: {}", message.into()))
}

fn validate_llm(config: &Config) -> ConfigResult<()> {
    let llm = &config.llm;
    if llm.model.trim().is_empty() {
        return Err(err("llm.model", "must not be empty"));
    }
    if llm.max_tokens == 0 {
        return Err(err("llm.max_tokens", "must be greater than zero"));
    }
    if !(0.0..=1.0).contains(&llm.temperature) {
        return Err(err("llm.temperature", format!("{} is out of range 0.0..=1.0", llm.temperature)));
    }
    Ok(())
}

fn validate_agents(config: &Config) -> ConfigResult<()> {
    if config.agents.max_steps == 0 {
        return Err(err("agents.max_steps", "must be greater than zero"));
    }
    Ok(())
}

fn validate_context(config: &Config) -> ConfigResult<()> {
    let threshold = config.context.critically_full_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(err("context.critically_full_threshold", format!("{threshold} is out of range 0.0..=1.0")));
    }
    // 0 is a valid, deliberate value here: it disables Level-3 window
    // enforcement entirely, unlike every other zero-means-invalid numeric
    // field in this module.
    Ok(())
}

fn validate_costs(config: &Config) -> ConfigResult<()> {
    if let Some(budget) = config.costs.session_budget_usd {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(err("costs.session_budget_usd", "must be a finite positive number"));
        }
    }
    Ok(())
}

fn validate_health(config: &Config) -> ConfigResult<()> {
    if config.health.enabled && config.health.port == 0 {
        return Err(err("health.port", "must be nonzero when health.enabled is true"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let mut config = Config::default();
        config.llm.max_tokens = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = Config::default();
        config.context.critically_full_threshold = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_context_max_tokens_is_accepted() {
        let mut config = Config::default();
        config.context.max_tokens = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn negative_budget_is_rejected() {
        let mut config = Config::default();
        config.costs.session_budget_usd = Some(-1.0);
        assert!(validate(&config).is_err());
    }
}
