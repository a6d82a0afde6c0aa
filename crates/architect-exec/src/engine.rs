//! The Execution Engine (§4.6): the ten-step pipeline every tool call goes
//! through between the LLM proposing it and the LLM seeing its result.
//! Only an aborted confirmation prompt ever raises past this module — every
//! other outcome, including a panicking tool, comes back as a
//! [`ToolCallResult`].

use std::path::{Path, PathBuf};

use architect_confirm::{ConfirmDecision, ConfirmHandler, ConfirmOutcome, ConfirmPolicy, ConfirmRequest};
use architect_core::{ToolCall, ToolCallResult, ToolResult};
use architect_guardrails::{FileAccessKind, GuardrailsEngine};
use architect_hooks::{Hook, HookContext, HookEvent, HookExecutor, HookOutcome};
use architect_tools::{classify_command, CommandClass, ToolContext, ToolRegistry};
use futures::FutureExt;

use crate::dry_run::DryRunTracker;
use crate::error::{ExecError, ExecResult};
use crate::target::{count_lines, extract_path, extract_proposed_content};

/// Binds the Guardrails Engine, Hook Executor, and Confirmation Policy to
/// tool dispatch. One instance per agent run.
pub struct ExecutionEngine<'a> {
    pub registry: &'a ToolRegistry,
    pub guardrails: &'a GuardrailsEngine,
    pub hooks: &'a HookExecutor,
    pub hook_configs: &'a [Hook],
    pub confirm_policy: ConfirmPolicy,
    pub confirm_handler: &'a dyn ConfirmHandler,
    pub dry_run_tracker: &'a DryRunTracker,
}

impl<'a> ExecutionEngine<'a> {
    /// Run one tool call through the full pipeline.
    pub async fn dispatch(
        &self,
        call: &ToolCall,
        ctx: &ToolContext,
        session_id: &str,
        step: usize,
    ) -> ExecResult<ToolCallResult> {
        // Step 1: resolve tool by name.
        let tool = match self.registry.get(&call.name) {
            Ok(tool) => tool,
            Err(_) => {
                return Ok(ToolCallResult::new(
                    &call.name,
                    call.arguments.clone(),
                    ToolResult::fail(format!("tool not found: {}", call.name)),
                ));
            }
        };

        // Step 2: validate args.
        let args = match tool.validate_args(call.arguments.clone()) {
            Ok(args) => args,
            Err(e) => {
                return Ok(ToolCallResult::new(
                    &call.name,
                    call.arguments.clone(),
                    ToolResult::fail(format!("invalid arguments: {e}")),
                ));
            }
        };

        // Step 3: guardrails pre-checks.
        if let Some(result) = self.check_guardrails(&call.name, &args).await {
            return Ok(ToolCallResult::new(&call.name, args, result));
        }

        // Step 4: pre_tool_use hooks.
        let mut args = args;
        let pre_context = HookContext::for_tool_call(HookEvent::PreToolUse, &ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: args.clone(),
        })
        .with_session_id(session_id.to_string());
        let pre_executions = self.hooks.execute_all(self.hook_configs, &pre_context).await;
        for execution in &pre_executions {
            match &execution.outcome {
                HookOutcome::Block { reason } => {
                    return Ok(ToolCallResult::new(
                        &call.name,
                        args,
                        ToolResult::fail(format!("blocked by hook '{}': {reason}", execution.hook_name)),
                    ));
                }
                HookOutcome::Modify { modified_input } => {
                    args = modified_input.clone();
                }
                HookOutcome::Allow => {}
            }
        }

        // Step 5: confirmation policy.
        let mut was_confirmed = false;
        match self.confirm_outcome_for(&call.name, &args) {
            ConfirmOutcome::AutoAllow => {}
            ConfirmOutcome::RejectOutright => {
                return Ok(ToolCallResult::new(
                    &call.name,
                    args,
                    ToolResult::fail("rejected outright by confirmation policy (allowed-only mode)"),
                ));
            }
            ConfirmOutcome::RequiresPrompt => {
                let request = ConfirmRequest::new(
                    call.name.clone(),
                    args.to_string(),
                    confirm_reason(&call.name, &args),
                );
                match self.confirm_handler.confirm(&request).await {
                    Ok(ConfirmDecision::Accept) => was_confirmed = true,
                    Ok(ConfirmDecision::Reject) => {
                        return Ok(ToolCallResult::new(
                            &call.name,
                            args,
                            ToolResult::fail("rejected by user at confirmation prompt"),
                        ));
                    }
                    Ok(ConfirmDecision::Abort) | Err(_) => return Err(ExecError::UserInterrupt),
                }
            }
        }

        // Step 6: dry-run short-circuit. Write-like tools already respect
        // `ctx.dry_run` internally and produce a `[DRY-RUN] ...` result
        // without touching disk; the engine's job is only to record the
        // planned action for later reporting.
        if ctx.dry_run && is_write_like(&call.name) {
            self.dry_run_tracker
                .record(call.name.clone(), extract_path(&args).map(str::to_string), args.clone())
                .await;
        }

        // Step 7: execute, with a defensive panic catch so a broken tool
        // implementation can never take down the loop.
        let mut result = match std::panic::AssertUnwindSafe(tool.execute(args.clone(), ctx)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => ToolResult::fail(format!("tool '{}' panicked during execution", call.name)),
        };

        // Step 8: record the write in guardrails state.
        if result.success && is_write_like(&call.name) && !ctx.dry_run {
            if let Some(path) = extract_path(&args) {
                let lines = extract_proposed_content(&args).map(count_lines).unwrap_or(0);
                self.guardrails.record_file_touch(PathBuf::from(path), lines).await;
            }
        }

        // Step 9: post_tool_use hooks; synchronous ones may append context.
        let post_context = HookContext::for_tool_call(HookEvent::PostToolUse, &ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: args.clone(),
        })
        .with_session_id(session_id.to_string())
        .with_tool_result(result.clone())
        .with_step(step);
        let post_context = match extract_path(&args) {
            Some(path) => post_context.with_file_path(path.to_string()),
            None => post_context,
        };
        let post_executions = self.hooks.execute_all(self.hook_configs, &post_context).await;
        for execution in &post_executions {
            if let Some(extra) = &execution.extra_context {
                result.output = format!("{}\n\n[hook '{}']: {extra}", result.output, execution.hook_name);
            }
            if let HookOutcome::Block { reason } = &execution.outcome {
                tracing::warn!(
                    hook = %execution.hook_name,
                    tool = %call.name,
                    reason = %reason,
                    "post_tool_use hook reported block after execution; the call already ran and cannot be undone"
                );
            }
        }

        // Step 10: return.
        let mut tool_result = ToolCallResult::new(&call.name, args, result);
        if was_confirmed {
            tool_result = tool_result.confirmed();
        }
        if ctx.dry_run && is_write_like(&call.name) {
            tool_result = tool_result.dry_run();
        }
        Ok(tool_result)
    }

    /// Step 3: guardrail checks appropriate to this tool. Returns `Some`
    /// with the denial [`ToolResult`] if blocked.
    async fn check_guardrails(&self, tool_name: &str, args: &serde_json::Value) -> Option<ToolResult> {
        if tool_name == "run_command" {
            if let Some(command) = args.get("command").and_then(|v| v.as_str()) {
                let decision = self.guardrails.check_command(command).await;
                if decision.is_denied() {
                    return decision.into_tool_result();
                }
            }
            return None;
        }

        if let Some(path) = extract_path(args) {
            let kind = if is_write_like(tool_name) { FileAccessKind::Write } else { FileAccessKind::Read };
            let decision = self.guardrails.check_file_access(kind, Path::new(path));
            if decision.is_denied() {
                return decision.into_tool_result();
            }

            if is_write_like(tool_name) {
                let added_lines = extract_proposed_content(args).map(count_lines).unwrap_or(0);
                let decision = self.guardrails.check_edit_limits(Path::new(path), added_lines).await;
                if decision.is_denied() {
                    return decision.into_tool_result();
                }
            }
        }

        if is_write_like(tool_name) {
            if let Some(content) = extract_proposed_content(args) {
                let decision = self.guardrails.check_code_rules(content);
                if decision.is_denied() {
                    return decision.into_tool_result();
                }
            }
        }

        None
    }

    /// Step 5: decide the confirmation outcome for this call, classifying
    /// `run_command` dynamically rather than by a static sensitivity flag.
    fn confirm_outcome_for(&self, tool_name: &str, args: &serde_json::Value) -> ConfirmOutcome {
        if tool_name == "run_command" {
            let class = args
                .get("command")
                .and_then(|v| v.as_str())
                .map(classify_command)
                .unwrap_or(CommandClass::Dangerous);
            return self.confirm_policy.for_command(class);
        }

        let sensitive = self.registry.get(tool_name).map(|t| t.sensitive()).unwrap_or(true);
        self.confirm_policy.for_tool(sensitive)
    }
}

/// Tool names whose arguments represent a write the workspace will see.
fn is_write_like(tool_name: &str) -> bool {
    matches!(tool_name, "write_file" | "edit_file")
}

/// Human-readable reason shown on a confirmation prompt.
fn confirm_reason(tool_name: &str, args: &serde_json::Value) -> String {
    if tool_name == "run_command" {
        let class = args
            .get("command")
            .and_then(|v| v.as_str())
            .map(classify_command)
            .unwrap_or(CommandClass::Dangerous);
        return format!("{class:?} command").to_lowercase();
    }
    "sensitive tool".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_confirm::AutoAcceptHandler;
    use architect_core::ConfirmMode;
    use architect_guardrails::GuardrailsConfig;
    use architect_workspace::WorkspaceConfig;

    fn workspace(dir: &std::path::Path) -> WorkspaceConfig {
        WorkspaceConfig::new(dir.to_path_buf())
    }

    #[tokio::test]
    async fn unknown_tool_returns_not_found_result_without_raising() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_defaults();
        let guardrails = GuardrailsEngine::new(GuardrailsConfig::default());
        let hooks = HookExecutor::new();
        let hook_configs: Vec<Hook> = Vec::new();
        let confirm_policy = ConfirmPolicy::new(ConfirmMode::Yolo);
        let handler = AutoAcceptHandler;
        let tracker = DryRunTracker::new();

        let engine = ExecutionEngine {
            registry: &registry,
            guardrails: &guardrails,
            hooks: &hooks,
            hook_configs: &hook_configs,
            confirm_policy,
            confirm_handler: &handler,
            dry_run_tracker: &tracker,
        };

        let ctx = ToolContext::new(workspace(tmp.path()));
        let call = ToolCall::new("call-1", "no_such_tool");
        let result = engine.dispatch(&call, &ctx, "session-1", 1).await.unwrap();
        assert!(!result.result.success);
        assert!(result.result.error.unwrap().contains("tool not found"));
    }

    #[tokio::test]
    async fn protected_file_write_is_blocked_by_guardrails() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_defaults();
        let guardrails = GuardrailsEngine::new(GuardrailsConfig::default());
        let hooks = HookExecutor::new();
        let hook_configs: Vec<Hook> = Vec::new();
        let confirm_policy = ConfirmPolicy::new(ConfirmMode::Yolo);
        let handler = AutoAcceptHandler;
        let tracker = DryRunTracker::new();

        let engine = ExecutionEngine {
            registry: &registry,
            guardrails: &guardrails,
            hooks: &hooks,
            hook_configs: &hook_configs,
            confirm_policy,
            confirm_handler: &handler,
            dry_run_tracker: &tracker,
        };

        let ctx = ToolContext::new(workspace(tmp.path()));
        let call = ToolCall::new("call-1", "write_file")
            .with_arguments(serde_json::json!({"file_path": ".env", "content": "SECRET=1"}));
        let result = engine.dispatch(&call, &ctx, "session-1", 1).await.unwrap();
        assert!(!result.result.success);
        assert!(result.result.error.unwrap().contains("blocked by guardrails"));
    }

    #[tokio::test]
    async fn dry_run_records_planned_write_and_skips_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_defaults();
        let guardrails = GuardrailsEngine::new(GuardrailsConfig::default());
        let hooks = HookExecutor::new();
        let hook_configs: Vec<Hook> = Vec::new();
        let confirm_policy = ConfirmPolicy::new(ConfirmMode::Yolo);
        let handler = AutoAcceptHandler;
        let tracker = DryRunTracker::new();

        let engine = ExecutionEngine {
            registry: &registry,
            guardrails: &guardrails,
            hooks: &hooks,
            hook_configs: &hook_configs,
            confirm_policy,
            confirm_handler: &handler,
            dry_run_tracker: &tracker,
        };

        let ctx = ToolContext::new(workspace(tmp.path())).dry_run();
        let call = ToolCall::new("call-1", "write_file")
            .with_arguments(serde_json::json!({"file_path": "new.txt", "content": "hi"}));
        let result = engine.dispatch(&call, &ctx, "session-1", 1).await.unwrap();
        assert!(result.was_dry_run);
        assert!(!tmp.path().join("new.txt").exists());
        assert_eq!(tracker.planned_actions().await.len(), 1);
    }

    #[tokio::test]
    async fn post_tool_use_hook_receives_result_and_step() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_defaults();
        let guardrails = GuardrailsEngine::new(GuardrailsConfig::default());
        let hooks = HookExecutor::new();
        let hook_configs = vec![Hook::new(
            "gate",
            r#"if grep -q '"step":7' && grep -q '"success":true'; then echo step-7-ok; fi"#,
            HookEvent::PostToolUse,
        )];
        let confirm_policy = ConfirmPolicy::new(ConfirmMode::Yolo);
        let handler = AutoAcceptHandler;
        let tracker = DryRunTracker::new();

        let engine = ExecutionEngine {
            registry: &registry,
            guardrails: &guardrails,
            hooks: &hooks,
            hook_configs: &hook_configs,
            confirm_policy,
            confirm_handler: &handler,
            dry_run_tracker: &tracker,
        };

        let ctx = ToolContext::new(workspace(tmp.path()));
        let call = ToolCall::new("call-1", "write_file")
            .with_arguments(serde_json::json!({"file_path": "new.txt", "content": "hi"}));
        let result = engine.dispatch(&call, &ctx, "session-1", 7).await.unwrap();
        assert!(result.result.success);
        assert!(result.result.output.contains("step-7-ok"));
    }

    #[tokio::test]
    async fn abort_decision_raises_user_interrupt() {
        struct AbortHandler;
        #[async_trait::async_trait]
        impl ConfirmHandler for AbortHandler {
            async fn confirm(
                &self,
                _request: &ConfirmRequest,
            ) -> architect_confirm::ConfirmResult<ConfirmDecision> {
                Ok(ConfirmDecision::Abort)
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_defaults();
        let guardrails = GuardrailsEngine::new(GuardrailsConfig::default());
        let hooks = HookExecutor::new();
        let hook_configs: Vec<Hook> = Vec::new();
        let confirm_policy = ConfirmPolicy::new(ConfirmMode::ConfirmAll);
        let handler = AbortHandler;
        let tracker = DryRunTracker::new();

        let engine = ExecutionEngine {
            registry: &registry,
            guardrails: &guardrails,
            hooks: &hooks,
            hook_configs: &hook_configs,
            confirm_policy,
            confirm_handler: &handler,
            dry_run_tracker: &tracker,
        };

        let ctx = ToolContext::new(workspace(tmp.path()));
        let call = ToolCall::new("call-1", "write_file")
            .with_arguments(serde_json::json!({"file_path": "new.txt", "content": "hi"}));
        let result = engine.dispatch(&call, &ctx, "session-1", 1).await;
        assert!(matches!(result, Err(ExecError::UserInterrupt)));
    }
}
