//! The Agent Loop (§4.11): the per-run driver that alternates LLM calls
//! with tool execution until the model finishes or a safety net fires.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use architect_confirm::ConfirmHandler;
use architect_confirm::ConfirmPolicy;
use architect_context::ContextManager;
use architect_core::{
    AgentConfig, AgentState, ConfirmMode, Message, StopReason, ToolCall, ToolCallResult,
};
use architect_cost::{CostSource, CostTracker};
use architect_exec::{DryRunTracker, ExecError, ExecutionEngine};
use architect_guardrails::GuardrailsEngine;
use architect_hooks::{Hook, HookExecutor};
use architect_llm::{LlmAdapter, LlmProvider, ToolSchema};
use architect_tools::ToolContext;
use architect_tools::ToolRegistry;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use crate::error::RuntimeResult;
use crate::session::{Session, SessionStore};
use crate::summarizer::LlmSummarizer;

/// Tool names whose arguments represent a write the workspace will see.
/// Mirrors the Execution Engine's own notion of "write-like", needed here
/// only to decide which results feed `files_modified`.
fn is_write_like(tool_name: &str) -> bool {
    matches!(tool_name, "write_file" | "edit_file")
}

/// Everything a finished (or gracefully closed) run returns.
#[derive(Debug)]
pub struct AgentRunOutcome {
    pub state: AgentState,
    pub session: Session,
}

/// Composes every other crate's engine into the single-threaded control
/// loop described by §4.11. One instance per agent run; reentrancy (Ralph,
/// Pipeline, Parallel, Auto-Review) works by constructing a fresh instance
/// each time, optionally sharing a [`CostTracker`] for a combined budget.
pub struct AgentLoop<P: LlmProvider> {
    pub adapter: Arc<LlmAdapter<P>>,
    pub registry: Arc<ToolRegistry>,
    pub guardrails: Arc<GuardrailsEngine>,
    pub hooks: Arc<HookExecutor>,
    pub hook_configs: Vec<Hook>,
    pub confirm_policy: ConfirmPolicy,
    pub confirm_handler: Arc<dyn ConfirmHandler>,
    pub context_manager: ContextManager,
    pub summarizer: Arc<LlmSummarizer<P>>,
    pub cost_tracker: Arc<Mutex<CostTracker>>,
    pub dry_run_tracker: Arc<DryRunTracker>,
    pub tool_ctx: Arc<ToolContext>,
    pub config: AgentConfig,
    pub interrupt: crate::interrupt::InterruptFlag,
    pub session_store: Arc<SessionStore>,
}

impl<P: LlmProvider> AgentLoop<P> {
    /// Run a fresh agent turn to completion (natural finish, safety net, or
    /// unrecoverable error). `extra_system_context` is appended verbatim to
    /// the configured system prompt: repo index summaries, `.architect.md`
    /// content, and matched skill snippets are all assembled by the caller,
    /// keeping this crate free of a dependency on the indexer.
    pub async fn run(
        &self,
        task: impl Into<String>,
        agent_name: impl Into<String>,
        extra_system_context: Option<&str>,
    ) -> RuntimeResult<AgentRunOutcome> {
        let task = task.into();
        let agent_name = agent_name.into();
        let start = Instant::now();

        let system_prompt = match extra_system_context {
            Some(extra) if !extra.is_empty() => format!("{}\n\n{extra}", self.config.system_prompt),
            _ => self.config.system_prompt.clone(),
        };

        let mut state = AgentState::new(system_prompt, task.clone());
        let mut session = Session::new(&agent_name, self.adapter.provider().model(), &task);

        let tool_schema: Vec<ToolSchema> = self.registry.get_schemas(self.config.allowed_tools.as_deref());
        let tool_schema_json = serde_json::to_string(&tool_schema).unwrap_or_default();

        loop {
            if let Some(reason) = self.check_safety(&state, start, &tool_schema_json).await {
                self.graceful_close(&mut state, reason).await?;
                break;
            }

            self.context_manager.run(&mut state.messages, self.summarizer.as_ref()).await;

            let response = match self.adapter.completion(&state.messages, Some(tool_schema.as_slice()), None).await {
                Ok(response) => response,
                Err(e) => {
                    state.finish_failed(StopReason::LlmError, e.to_string());
                    break;
                }
            };
            self.cost_tracker
                .lock()
                .await
                .record(state.step_count(), self.adapter.provider().model(), response.usage, CostSource::Agent);

            if !response.has_tool_calls() {
                let final_output = response.content.clone();
                state.messages.push(response.into_message());
                state.finish_success(final_output);
                break;
            }

            let tool_calls = response.tool_calls.clone();
            let assistant_message = response.into_message();
            state.messages.push(assistant_message.clone());

            let current_step = state.step_count() + 1;
            let results = match self.dispatch_tool_calls(&tool_calls, &session.session_id, current_step).await {
                Ok(results) => results,
                Err(ExecError::UserInterrupt) => {
                    self.interrupt.trigger();
                    self.graceful_close(&mut state, StopReason::UserInterrupt).await?;
                    break;
                }
            };

            for (call, result) in tool_calls.iter().zip(results.iter()) {
                state.messages.push(Message::tool_output(call.id.clone(), result.result.display_text().to_string()));
            }
            self.context_manager.run(&mut state.messages, self.summarizer.as_ref()).await;

            for result in &results {
                if result.result.success && is_write_like(&result.tool_name) && !result.was_dry_run
                    && let Some(path) = architect_exec::extract_path(&result.args)
                {
                    session.record_file_modified(PathBuf::from(path));
                }
            }

            state.steps.push(architect_core::StepResult {
                step_number: state.step_count(),
                llm_response: assistant_message,
                tool_calls_made: results,
                timestamp: Utc::now(),
            });

            let total_cost = self.cost_tracker.lock().await.total_cost_usd();
            session.sync_from_state(&state, total_cost);
            self.session_store.save(&session)?;
        }

        let total_cost = self.cost_tracker.lock().await.total_cost_usd();
        session.sync_from_state(&state, total_cost);
        self.session_store.save(&session)?;

        Ok(AgentRunOutcome { state, session })
    }

    /// §4.11 step 1, in strict precedence order.
    async fn check_safety(&self, state: &AgentState, start: Instant, tool_schema_json: &str) -> Option<StopReason> {
        if self.interrupt.is_set() {
            return Some(StopReason::UserInterrupt);
        }
        if state.step_count() as u32 >= self.config.max_steps {
            return Some(StopReason::MaxSteps);
        }
        if self.cost_tracker.lock().await.is_over_budget() {
            return Some(StopReason::BudgetExceeded);
        }
        if let Some(timeout_secs) = self.config.timeout_secs
            && start.elapsed().as_secs() >= timeout_secs
        {
            return Some(StopReason::Timeout);
        }
        if self.context_manager.is_critically_full(&state.messages, tool_schema_json) {
            return Some(StopReason::ContextFull);
        }
        None
    }

    /// Appends the close-instruction turn, makes one tools-disabled LLM
    /// call, and finalizes `state` as `partial`. `USER_INTERRUPT` skips the
    /// LLM call entirely per §4.11.
    async fn graceful_close(&self, state: &mut AgentState, reason: StopReason) -> RuntimeResult<()> {
        if reason == StopReason::UserInterrupt {
            let summary = format!("Run interrupted by the user after {} step(s).", state.step_count());
            state.finish_partial(reason, summary);
            return Ok(());
        }

        state.messages.push(Message::user(reason.close_instruction()));

        match self.adapter.completion(&state.messages, None, None).await {
            Ok(response) => {
                self.cost_tracker.lock().await.record(
                    state.step_count(),
                    self.adapter.provider().model(),
                    response.usage,
                    CostSource::Agent,
                );
                let final_output = response.content.clone();
                state.messages.push(response.into_message());
                state.finish_partial(reason, final_output);
            }
            Err(e) => {
                state.finish_failed(StopReason::LlmError, format!("graceful close failed: {e}"));
            }
        }
        Ok(())
    }

    /// §4.11 step 5/6: decide sequential vs. bounded-parallel dispatch and
    /// run every call in this batch through the Execution Engine.
    async fn dispatch_tool_calls(
        &self,
        tool_calls: &[ToolCall],
        session_id: &str,
        step: usize,
    ) -> Result<Vec<ToolCallResult>, ExecError> {
        if self.should_run_sequentially(tool_calls) {
            let mut results = Vec::with_capacity(tool_calls.len());
            for call in tool_calls {
                results.push(self.build_engine().dispatch(call, &self.tool_ctx, session_id, step).await?);
            }
            return Ok(results);
        }

        const MAX_CONCURRENCY: usize = 4;
        let indexed = stream::iter(tool_calls.iter().enumerate())
            .map(|(index, call)| async move {
                let result = self.build_engine().dispatch(call, &self.tool_ctx, session_id, step).await;
                (index, result)
            })
            .buffer_unordered(MAX_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut ordered: Vec<Option<ToolCallResult>> = (0..tool_calls.len()).map(|_| None).collect();
        for (index, result) in indexed {
            ordered[index] = Some(result?);
        }
        Ok(ordered.into_iter().map(|r| r.expect("every index filled by its worker")).collect())
    }

    /// Sequential if independence can't be assumed: parallel tools
    /// disabled, `confirm-all` mode, `confirm-sensitive` mode with any
    /// sensitive call in the batch, or a single call (nothing to
    /// parallelize).
    fn should_run_sequentially(&self, tool_calls: &[ToolCall]) -> bool {
        if !self.config.parallel_tools || tool_calls.len() <= 1 {
            return true;
        }
        match self.config.confirm_mode {
            ConfirmMode::ConfirmAll => true,
            ConfirmMode::ConfirmSensitive => tool_calls.iter().any(|c| self.is_sensitive(&c.name)),
            ConfirmMode::Yolo => false,
        }
    }

    fn is_sensitive(&self, tool_name: &str) -> bool {
        self.registry.get(tool_name).map(|t| t.sensitive()).unwrap_or(true)
    }

    fn build_engine(&self) -> ExecutionEngine<'_> {
        ExecutionEngine {
            registry: self.registry.as_ref(),
            guardrails: self.guardrails.as_ref(),
            hooks: self.hooks.as_ref(),
            hook_configs: &self.hook_configs,
            confirm_policy: self.confirm_policy,
            confirm_handler: self.confirm_handler.as_ref(),
            dry_run_tracker: self.dry_run_tracker.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_confirm::AutoAcceptHandler;
    use architect_context::ContextConfig;
    use architect_cost::{PriceTable, Usage};
    use architect_guardrails::GuardrailsConfig;
    use architect_llm::{CompletionResponse, FinishReason, LlmResult, StreamCallback};
    use architect_workspace::WorkspaceConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers with tool calls for the first `tool_rounds` completions,
    /// then a plain text answer.
    struct ScriptedProvider {
        tool_rounds: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }
        fn model(&self) -> &str {
            "scripted-model"
        }
        fn max_context_tokens(&self) -> usize {
            100_000
        }

        async fn completion(
            &self,
            _messages: &[Message],
            tools_schema: Option<&[ToolSchema]>,
            _stream_callback: Option<&mut StreamCallback<'_>>,
        ) -> LlmResult<CompletionResponse> {
            let round = self.calls.fetch_add(1, Ordering::SeqCst);
            if tools_schema.is_none() || round >= self.tool_rounds {
                return Ok(CompletionResponse {
                    content: "final answer".to_string(),
                    tool_calls: vec![],
                    finish_reason: FinishReason::EndTurn,
                    usage: Usage::new(10, 10),
                });
            }
            Ok(CompletionResponse {
                content: String::new(),
                tool_calls: vec![ToolCall::new(format!("call-{round}"), "read_file")
                    .with_arguments(serde_json::json!({"file_path": "README.md"}))],
                finish_reason: FinishReason::ToolUse,
                usage: Usage::new(10, 10),
            })
        }
    }

    fn build_loop(tmp: &std::path::Path, tool_rounds: usize, max_steps: u32) -> AgentLoop<ScriptedProvider> {
        std::fs::write(tmp.join("README.md"), "hello\n").unwrap();
        let workspace = WorkspaceConfig::new(tmp.to_path_buf());
        let provider = ScriptedProvider { tool_rounds, calls: AtomicUsize::new(0) };
        let adapter = Arc::new(LlmAdapter::new(provider, 0));

        let mut config = AgentConfig::default();
        config.max_steps = max_steps;

        AgentLoop {
            adapter: adapter.clone(),
            registry: Arc::new(ToolRegistry::with_defaults()),
            guardrails: Arc::new(GuardrailsEngine::new(GuardrailsConfig::default())),
            hooks: Arc::new(HookExecutor::new()),
            hook_configs: Vec::new(),
            confirm_policy: ConfirmPolicy::new(ConfirmMode::Yolo),
            confirm_handler: Arc::new(AutoAcceptHandler),
            context_manager: ContextManager::new(ContextConfig::default()),
            summarizer: Arc::new(LlmSummarizer::new(adapter)),
            cost_tracker: Arc::new(Mutex::new(CostTracker::new(PriceTable::default()))),
            dry_run_tracker: Arc::new(DryRunTracker::new()),
            tool_ctx: Arc::new(ToolContext::new(workspace)),
            config,
            interrupt: crate::interrupt::InterruptFlag::new(),
            session_store: Arc::new(SessionStore::new(tmp.join(".architect/sessions"))),
        }
    }

    #[tokio::test]
    async fn natural_completion_reads_a_file_then_stops() {
        let tmp = tempfile::tempdir().unwrap();
        let agent_loop = build_loop(tmp.path(), 1, 50);
        let outcome = agent_loop.run("read the readme", "builder", None).await.unwrap();

        assert_eq!(outcome.state.status, architect_core::AgentStatus::Success);
        assert_eq!(outcome.state.stop_reason, Some(StopReason::LlmDone));
        assert_eq!(outcome.state.step_count(), 1);
        assert_eq!(outcome.session.steps_count, 1);
    }

    #[tokio::test]
    async fn max_steps_triggers_graceful_close() {
        let tmp = tempfile::tempdir().unwrap();
        let agent_loop = build_loop(tmp.path(), 10, 2);
        let outcome = agent_loop.run("loop forever", "builder", None).await.unwrap();

        assert_eq!(outcome.state.status, architect_core::AgentStatus::Partial);
        assert_eq!(outcome.state.stop_reason, Some(StopReason::MaxSteps));
        assert_eq!(outcome.state.step_count(), 2);
    }

    #[tokio::test]
    async fn user_interrupt_skips_the_final_llm_call() {
        let tmp = tempfile::tempdir().unwrap();
        let agent_loop = build_loop(tmp.path(), 10, 50);
        agent_loop.interrupt.trigger();
        let outcome = agent_loop.run("anything", "builder", None).await.unwrap();

        assert_eq!(outcome.state.status, architect_core::AgentStatus::Partial);
        assert_eq!(outcome.state.stop_reason, Some(StopReason::UserInterrupt));
        assert_eq!(outcome.state.step_count(), 0);
    }

    #[tokio::test]
    async fn session_is_persisted_and_reloadable() {
        let tmp = tempfile::tempdir().unwrap();
        let agent_loop = build_loop(tmp.path(), 1, 50);
        let outcome = agent_loop.run("read the readme", "builder", None).await.unwrap();

        let reloaded = agent_loop.session_store.load(&outcome.session.session_id).unwrap().unwrap();
        assert_eq!(reloaded.status, architect_core::AgentStatus::Success);
    }
}
