//! Assembles one [`AgentLoop`] from resolved configuration and per-run
//! overrides. Every orchestration command (`run`, `loop`, `pipeline`,
//! `parallel`) goes through this so the engines are wired up identically
//! regardless of which surface invoked them.

use std::sync::Arc;

use architect_confirm::{AutoAcceptHandler, CliConfirmHandler, ConfirmHandler, ConfirmPolicy};
use architect_config::Config;
use architect_context::{ContextConfig, ContextManager};
use architect_core::{AgentConfig, ConfirmMode};
use architect_cost::{CostTracker, PriceTable};
use architect_exec::DryRunTracker;
use architect_guardrails::GuardrailsEngine;
use architect_hooks::HookExecutor;
use architect_llm::{ClaudeProvider, LlmAdapter, ProviderConfig};
use architect_runtime::{AgentLoop, InterruptFlag, LlmSummarizer, SessionStore};
use architect_tools::{ToolContext, ToolRegistry};
use tokio::sync::Mutex;

use crate::error::{CliError, CliResult};

/// Overrides layered on top of a resolved [`Config`] for a single run.
/// Every field mirrors a `run`/`loop`/`pipeline`/`parallel` flag; `None`
/// means "use the config value".
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub model: Option<String>,
    pub confirm_mode: Option<ConfirmMode>,
    pub max_cost_usd: Option<f64>,
    pub max_steps: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub dry_run: bool,
    pub allowed_tools: Option<Vec<String>>,
    pub system_prompt: Option<String>,
    pub parallel_tools_disabled: bool,
}

fn resolve_api_key(api_key_env: &str) -> CliResult<String> {
    std::env::var(api_key_env)
        .or_else(|_| std::env::var("LITELLM_API_KEY"))
        .map_err(|_| CliError::Config(format!("no API key found in ${api_key_env} or $LITELLM_API_KEY")))
}

/// Build a fresh [`AgentLoop`] wired from `config` and `overrides`, rooted
/// at `workspace_root`. `interrupt` is shared with the caller so a signal
/// handler installed once in `main` stops every loop built from it.
pub fn build_agent_loop(
    config: &Config,
    workspace_root: &std::path::Path,
    overrides: &RunOverrides,
    interrupt: InterruptFlag,
    quiet: bool,
) -> CliResult<Arc<AgentLoop<ClaudeProvider>>> {
    let model = overrides.model.clone().unwrap_or_else(|| config.llm.model.clone());
    let api_key = resolve_api_key(&config.llm.api_key_env)?;

    let mut provider_config = ProviderConfig::new(api_key, &model)
        .max_tokens(config.llm.max_tokens)
        .temperature(config.llm.temperature)
        .with_prompt_caching(config.llm.prompt_caching);
    if let Some(base_url) = &config.llm.base_url {
        provider_config = provider_config.base_url(base_url.clone());
    }
    let provider = ClaudeProvider::new(provider_config);
    let adapter = Arc::new(LlmAdapter::new(provider, config.llm.max_retries));

    let workspace = config.workspace.resolve(workspace_root.to_path_buf());
    let registry = Arc::new(ToolRegistry::with_defaults());
    let guardrails = Arc::new(GuardrailsEngine::new(config.guardrails.clone()));
    let hooks = Arc::new(HookExecutor::new());
    let hook_configs = config.hooks.hooks.clone();

    let confirm_mode = overrides.confirm_mode.unwrap_or(config.agents.default_confirm_mode);
    let confirm_policy = ConfirmPolicy::new(confirm_mode);
    let confirm_handler: Arc<dyn ConfirmHandler> =
        if confirm_mode == ConfirmMode::Yolo || quiet { Arc::new(AutoAcceptHandler) } else { Arc::new(CliConfirmHandler::new()) };

    let context_config = ContextConfig {
        max_context_tokens: config.context.max_tokens,
        compress_threshold: config.context.critically_full_threshold,
        ..ContextConfig::default()
    };
    let context_manager = ContextManager::new(context_config);
    let summarizer = Arc::new(LlmSummarizer::new(adapter.clone()));

    let mut cost_tracker = CostTracker::new(PriceTable::default());
    let budget = overrides.max_cost_usd.or(config.agents.max_cost_usd);
    if let Some(budget) = budget {
        cost_tracker = cost_tracker.with_budget(budget);
    }

    let dry_run_tracker = Arc::new(DryRunTracker::new());
    let tool_ctx = if overrides.dry_run { ToolContext::new(workspace).dry_run() } else { ToolContext::new(workspace) };

    let mut agent_config = AgentConfig {
        system_prompt: overrides.system_prompt.clone().unwrap_or_default(),
        allowed_tools: overrides.allowed_tools.clone(),
        confirm_mode,
        max_steps: overrides.max_steps.unwrap_or(config.agents.max_steps),
        max_cost_usd: budget,
        timeout_secs: overrides.timeout_secs.or(config.agents.timeout_secs),
        parallel_tools: config.agents.parallel_tools && !overrides.parallel_tools_disabled,
        dry_run: overrides.dry_run,
    };
    if agent_config.system_prompt.is_empty() {
        agent_config.system_prompt = default_system_prompt();
    }

    let sessions_dir = workspace_root.join(".architect").join("sessions");
    let session_store = Arc::new(SessionStore::new(sessions_dir));

    Ok(Arc::new(AgentLoop {
        adapter,
        registry,
        guardrails,
        hooks,
        hook_configs,
        confirm_policy,
        confirm_handler,
        context_manager,
        summarizer,
        cost_tracker: Arc::new(Mutex::new(cost_tracker)),
        dry_run_tracker,
        tool_ctx: Arc::new(tool_ctx),
        config: agent_config,
        interrupt,
        session_store,
    }))
}

fn default_system_prompt() -> String {
    "You are Architect, a headless coding agent. You have access to file and \
     shell tools in a sandboxed workspace. Work autonomously toward the given \
     task, using tools as needed, and stop once it is complete."
        .to_string()
}
