//! Loads and layers configuration: defaults -> YAML file -> env -> CLI,
//! recording which layer each top-level section's final value came from.

use std::collections::HashMap;
use std::path::Path;

use architect_hooks::normalize_legacy_post_edit;

use crate::cli::{apply_cli_overrides, CliOverrides};
use crate::env::apply_env_overrides;
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{mark_sections_present, ConfigLayer, FieldSources, SECTION_NAMES};
use crate::types::Config;
use crate::validate;

/// Maximum allowed config file size (1 MB), checked before the file is read
/// to bound memory use regardless of what's on disk.
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Config,
    pub field_sources: FieldSources,
    pub loaded_file: Option<String>,
}

/// Loads configuration with the full precedence chain. `file_path` is the
/// workspace's `.architect/config.yaml` (or equivalent); `None` skips the
/// file layer entirely and proceeds with defaults, env, and CLI only.
pub fn load(
    file_path: Option<&Path>,
    env: &HashMap<String, String>,
    cli: &CliOverrides,
) -> ConfigResult<ResolvedConfig> {
    let mut sources: FieldSources = SECTION_NAMES.iter().map(|name| (name.to_string(), ConfigLayer::Defaults)).collect();

    let mut config = Config::default();
    let mut loaded_file = None;

    if let Some(path) = file_path {
        match std::fs::metadata(path) {
            Ok(metadata) if metadata.len() > MAX_CONFIG_FILE_SIZE => {
                return Err(ConfigError::Validation(format!(
                    "config file {} is {} bytes, exceeding the {} byte limit",
                    path.display(),
                    metadata.len(),
                    MAX_CONFIG_FILE_SIZE
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
            }
            Err(source) => return Err(ConfigError::Read { path: path.display().to_string(), source }),
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let raw: serde_yaml::Value = serde_yaml::from_str(&content)
                    .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
                mark_sections_present(&raw, &mut sources);
                config = serde_yaml::from_value(raw)
                    .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
                loaded_file = Some(path.display().to_string());
                tracing::info!(path = %path.display(), "loaded config file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
            }
            Err(source) => return Err(ConfigError::Read { path: path.display().to_string(), source }),
        }
    }

    apply_env_overrides(&mut config, env, &mut sources);
    apply_cli_overrides(&mut config, cli, &mut sources);

    config.hooks.hooks = config.hooks.hooks.into_iter().map(normalize_legacy_post_edit).collect();

    validate::validate(&config)?;

    Ok(ResolvedConfig { config, field_sources: sources, loaded_file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let resolved = load(Some(Path::new("/nonexistent/config.yaml")), &HashMap::new(), &CliOverrides::default()).unwrap();
        assert_eq!(resolved.config.llm.model, Config::default().llm.model);
        assert!(resolved.loaded_file.is_none());
    }

    #[test]
    fn file_overrides_defaults_and_is_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "llm:\n  model: claude-opus\n").unwrap();

        let resolved = load(Some(&path), &HashMap::new(), &CliOverrides::default()).unwrap();
        assert_eq!(resolved.config.llm.model, "claude-opus");
        assert_eq!(resolved.field_sources.get("llm"), Some(&ConfigLayer::File));
        assert_eq!(resolved.field_sources.get("agents"), Some(&ConfigLayer::Defaults));
    }

    #[test]
    fn cli_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "llm:\n  model: claude-opus\n").unwrap();

        let cli = CliOverrides { model: Some("claude-haiku".to_string()), ..Default::default() };
        let resolved = load(Some(&path), &HashMap::new(), &cli).unwrap();
        assert_eq!(resolved.config.llm.model, "claude-haiku");
        assert_eq!(resolved.field_sources.get("llm"), Some(&ConfigLayer::Cli));
    }

    #[test]
    fn unknown_key_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "nonsense: true\n").unwrap();

        let result = load(Some(&path), &HashMap::new(), &CliOverrides::default());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn oversized_file_is_rejected_before_being_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let oversized = "x".repeat(MAX_CONFIG_FILE_SIZE as usize + 1);
        std::fs::write(&path, oversized).unwrap();

        let result = load(Some(&path), &HashMap::new(), &CliOverrides::default());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn invalid_merged_config_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "llm:\n  max_tokens: 0\n").unwrap();

        let result = load(Some(&path), &HashMap::new(), &CliOverrides::default());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn legacy_post_edit_hooks_are_normalized_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "hooks:\n  hooks:\n    - name: fmt\n      command: \"rustfmt {file}\"\n      event: post_tool_use\n      matcher: post_edit\n",
        )
        .unwrap();

        let resolved = load(Some(&path), &HashMap::new(), &CliOverrides::default()).unwrap();
        let hook = &resolved.config.hooks.hooks[0];
        assert_eq!(hook.matcher.as_deref(), Some("edit_file|write_file|apply_patch"));
    }
}
