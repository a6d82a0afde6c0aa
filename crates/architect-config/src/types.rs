//! The unified configuration tree (§6). Every top-level key spec.md names
//! gets one section, each independently defaultable and strict about
//! unknown fields.

use std::collections::BTreeMap;
use std::path::PathBuf;

use architect_core::ConfirmMode;
use architect_guardrails::GuardrailsConfig;
use architect_hooks::Hook;
use architect_workspace::{AutoAllow, EscapePolicy, WorkspaceConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSection {
    pub provider: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key value
    /// itself is never written to or read from the config file.
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub max_tokens: usize,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub prompt_caching: bool,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "claude".to_string(),
            model: "claude-sonnet-4-5".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: None,
            max_tokens: 8192,
            temperature: 0.0,
            timeout_secs: 120,
            max_retries: 3,
            prompt_caching: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentsSection {
    pub default_confirm_mode: ConfirmMode,
    pub max_steps: u32,
    pub max_cost_usd: Option<f64>,
    pub timeout_secs: Option<u64>,
    pub parallel_tools: bool,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            default_confirm_mode: ConfirmMode::default(),
            max_steps: 50,
            max_cost_usd: None,
            timeout_secs: None,
            parallel_tools: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSection {
    /// Workspace root, relative to the config file's location if relative.
    /// `None` resolves to the current directory at load time.
    pub root: Option<PathBuf>,
    pub never_allow: Vec<PathBuf>,
    pub allow_read: Vec<PathBuf>,
    pub allow_write: Vec<PathBuf>,
    pub escape_policy: EscapePolicy,
    pub allow_delete: bool,
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            root: None,
            never_allow: Vec::new(),
            allow_read: Vec::new(),
            allow_write: Vec::new(),
            escape_policy: EscapePolicy::default(),
            allow_delete: false,
        }
    }
}

impl WorkspaceSection {
    /// Resolve this section into a runtime [`WorkspaceConfig`], falling back
    /// to `default_root` (typically the current directory) when no root was
    /// configured.
    #[must_use]
    pub fn resolve(&self, default_root: impl Into<PathBuf>) -> WorkspaceConfig {
        let mut config = WorkspaceConfig::new(self.root.clone().unwrap_or_else(|| default_root.into()));
        config.never_allow = self.never_allow.clone();
        config.auto_allow = AutoAllow { read: self.allow_read.clone(), write: self.allow_write.clone(), patterns: Vec::new() };
        config.escape_policy = self.escape_policy;
        config.allow_delete = self.allow_delete;
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexerSection {
    pub enabled: bool,
    pub cache_ttl_secs: u64,
    pub skip_dirs: Vec<String>,
}

impl Default for IndexerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl_secs: 300,
            skip_dirs: vec![
                ".git".to_string(),
                "target".to_string(),
                "node_modules".to_string(),
                "dist".to_string(),
                "build".to_string(),
                ".venv".to_string(),
                "__pycache__".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextSection {
    pub max_tokens: usize,
    pub critically_full_threshold: f64,
    pub compress_old_turns: bool,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self { max_tokens: 150_000, critically_full_threshold: 0.95, compress_old_turns: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostsSection {
    pub session_budget_usd: Option<f64>,
    /// Per-model overrides of the built-in price table, as
    /// `{model_or_prefix: [input_per_mtok, output_per_mtok]}`.
    pub model_rates: BTreeMap<String, (f64, f64)>,
}

impl Default for CostsSection {
    fn default() -> Self {
        Self { session_budget_usd: None, model_rates: BTreeMap::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmCacheSection {
    pub enabled: bool,
    pub ttl_secs: u64,
}

impl Default for LlmCacheSection {
    fn default() -> Self {
        Self { enabled: false, ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommandsSection {
    pub default_timeout_secs: u64,
    pub max_output_chars: usize,
}

impl Default for CommandsSection {
    fn default() -> Self {
        Self { default_timeout_secs: 30, max_output_chars: 2_000 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HooksSection {
    pub hooks: Vec<Hook>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillsSection {
    pub directories: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemorySection {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self { enabled: false, path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McpServer {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McpSection {
    pub servers: Vec<McpServer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationSection {
    pub checks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetrySection {
    pub enabled: bool,
    pub endpoint: Option<String>,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self { enabled: false, endpoint: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthSection {
    pub enabled: bool,
    pub port: u16,
}

impl Default for HealthSection {
    fn default() -> Self {
        Self { enabled: false, port: 9090 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresetsSection {
    /// Named bundles of CLI flag defaults, applied when `--preset <name>`
    /// is given. Left as a raw YAML mapping: the CLI crate interprets each
    /// preset's keys against its own flag set, which this crate has no
    /// visibility into.
    pub presets: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub llm: LlmSection,
    pub agents: AgentsSection,
    pub workspace: WorkspaceSection,
    pub logging: LoggingSection,
    pub indexer: IndexerSection,
    pub context: ContextSection,
    pub costs: CostsSection,
    pub llm_cache: LlmCacheSection,
    pub commands: CommandsSection,
    pub hooks: HooksSection,
    pub guardrails: GuardrailsConfig,
    pub skills: SkillsSection,
    pub memory: MemorySection,
    pub mcp: McpSection,
    pub evaluation: EvaluationSection,
    pub telemetry: TelemetrySection,
    pub health: HealthSection,
    pub presets: PresetsSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection::default(),
            agents: AgentsSection::default(),
            workspace: WorkspaceSection::default(),
            logging: LoggingSection::default(),
            indexer: IndexerSection::default(),
            context: ContextSection::default(),
            costs: CostsSection::default(),
            llm_cache: LlmCacheSection::default(),
            commands: CommandsSection::default(),
            hooks: HooksSection::default(),
            guardrails: GuardrailsConfig::default(),
            skills: SkillsSection::default(),
            memory: MemorySection::default(),
            mcp: McpSection::default(),
            evaluation: EvaluationSection::default(),
            telemetry: TelemetrySection::default(),
            health: HealthSection::default(),
            presets: PresetsSection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.llm.model, config.llm.model);
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let yaml = "bogus_section:\n  foo: 1\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn unknown_nested_key_is_rejected() {
        let yaml = "llm:\n  bogus_field: 1\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn workspace_section_resolves_to_default_root_when_unset() {
        let section = WorkspaceSection::default();
        let resolved = section.resolve("/tmp/workspace");
        assert_eq!(resolved.root(), std::path::Path::new("/tmp/workspace"));
    }

    #[test]
    fn workspace_section_configured_root_wins_over_default() {
        let section = WorkspaceSection { root: Some(PathBuf::from("/configured")), ..Default::default() };
        let resolved = section.resolve("/tmp/workspace");
        assert_eq!(resolved.root(), std::path::Path::new("/configured"));
    }
}
