//! Agent run state: the closed set of stop reasons, per-step bookkeeping,
//! and the aggregate state the Agent Loop threads through one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{Message, ToolResult};

/// Why an agent run stopped. Closed set — the Agent Loop never stops for any
/// other reason, and every safety net maps onto exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopReason {
    /// The LLM produced a final answer with no further tool calls.
    LlmDone,
    /// `max_steps` was reached without the LLM finishing.
    MaxSteps,
    /// The cost tracker's hard budget was exceeded.
    BudgetExceeded,
    /// The context window could not be kept under the critical threshold.
    ContextFull,
    /// The run's wall-clock timeout elapsed.
    Timeout,
    /// The user interrupted the run (e.g. Ctrl-C).
    UserInterrupt,
    /// The LLM adapter returned a non-retryable error.
    LlmError,
}

impl StopReason {
    /// Whether a safety net should drive the graceful-close protocol before
    /// terminating (all safety nets except an unrecoverable LLM error, which
    /// has no live LLM left to ask for a summary).
    #[must_use]
    pub fn triggers_graceful_close(self) -> bool {
        !matches!(self, StopReason::LlmError)
    }

    /// Short directive text for the graceful-close instruction turn,
    /// templated per stop reason. Always requests a three-part answer:
    /// completed, pending, next step.
    #[must_use]
    pub fn close_instruction(self) -> &'static str {
        match self {
            StopReason::LlmDone | StopReason::LlmError => "Provide your final answer now.",
            StopReason::MaxSteps => {
                "You hit the step limit. Produce: (1) a summary of what you \
                 completed, (2) what remains, (3) a suggested next step."
            }
            StopReason::BudgetExceeded => {
                "You hit the cost budget for this run. Produce: (1) a summary \
                 of what you completed, (2) what remains, (3) a suggested \
                 next step."
            }
            StopReason::ContextFull => {
                "The context window for this run is full. Produce: (1) a \
                 summary of what you completed, (2) what remains, (3) a \
                 suggested next step."
            }
            StopReason::Timeout => {
                "You hit the time limit for this run. Produce: (1) a summary \
                 of what you completed, (2) what remains, (3) a suggested \
                 next step."
            }
            StopReason::UserInterrupt => {
                "This run was interrupted by the user. Produce: (1) a summary \
                 of what you completed, (2) what remains, (3) a suggested \
                 next step."
            }
        }
    }
}

/// Current phase of an agent run. Closed set per the data model: `running`
/// while the loop executes; a terminal status is set exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Actively stepping.
    Running,
    /// Finished naturally: the LLM declared completion.
    Success,
    /// Finished via a safety net's graceful close.
    Partial,
    /// Finished via an unrecoverable error.
    Failed,
}

impl AgentStatus {
    /// Whether this is one of the three terminal statuses.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, AgentStatus::Running)
    }
}

/// A single tool call's outcome as recorded in a [`StepResult`]. Immutable
/// once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Name of the tool invoked.
    pub tool_name: String,
    /// Arguments passed to the tool (post-validation).
    pub args: Value,
    /// The tool's result.
    pub result: ToolResult,
    /// Whether the confirmation policy prompted for, and the user accepted,
    /// this call.
    pub was_confirmed: bool,
    /// Whether this call was recorded as a planned write rather than
    /// executed (dry-run mode).
    pub was_dry_run: bool,
    /// When this call completed.
    pub timestamp: DateTime<Utc>,
}

impl ToolCallResult {
    /// Build a new tool call result, timestamped now.
    pub fn new(tool_name: impl Into<String>, args: Value, result: ToolResult) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
            result,
            was_confirmed: false,
            was_dry_run: false,
            timestamp: Utc::now(),
        }
    }

    /// Mark this result as having gone through a user confirmation prompt.
    #[must_use]
    pub fn confirmed(mut self) -> Self {
        self.was_confirmed = true;
        self
    }

    /// Mark this result as a dry-run recording rather than a real execution.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.was_dry_run = true;
        self
    }
}

/// The result of one iteration of the Agent Loop: an LLM call followed by
/// zero or more tool executions. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Step number, 0-based.
    pub step_number: usize,
    /// The assistant message produced this step (text, or tool-call stubs).
    pub llm_response: Message,
    /// Results of any tool calls made this step, in execution order.
    pub tool_calls_made: Vec<ToolCallResult>,
    /// When this step completed.
    pub timestamp: DateTime<Utc>,
}

/// The full state of one agent run, threaded through every step of the
/// Agent Loop and the basis for the persisted `Session` document.
///
/// Invariant: `status == Running` while the loop executes; a terminal status
/// is set exactly once. `stop_reason` is set whenever a terminal status is
/// reached, including natural completion (`LlmDone`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// Full conversation so far, in order.
    pub messages: Vec<Message>,
    /// Completed steps, in order.
    pub steps: Vec<StepResult>,
    /// Current phase.
    pub status: AgentStatus,
    /// Populated once `status` is terminal.
    pub stop_reason: Option<StopReason>,
    /// The final human-readable output, populated once `status` is terminal.
    pub final_output: Option<String>,
}

impl AgentState {
    /// Start a fresh run from a system prompt and initial user message.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt), Message::user(user_message)],
            steps: Vec::new(),
            status: AgentStatus::Running,
            stop_reason: None,
            final_output: None,
        }
    }

    /// Number of completed steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Finish the run naturally: the LLM declared completion with no
    /// further tool calls.
    pub fn finish_success(&mut self, final_output: impl Into<String>) {
        self.status = AgentStatus::Success;
        self.stop_reason = Some(StopReason::LlmDone);
        self.final_output = Some(final_output.into());
    }

    /// Finish the run via a safety net's graceful close.
    pub fn finish_partial(&mut self, reason: StopReason, final_output: impl Into<String>) {
        self.status = AgentStatus::Partial;
        self.stop_reason = Some(reason);
        self.final_output = Some(final_output.into());
    }

    /// Finish the run via an unrecoverable error.
    pub fn finish_failed(&mut self, reason: StopReason, error_message: impl Into<String>) {
        self.status = AgentStatus::Failed;
        self.stop_reason = Some(reason);
        self.final_output = Some(error_message.into());
    }

    /// Whether the run has reached a terminal status.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graceful_close_skips_llm_error_only() {
        assert!(!StopReason::LlmError.triggers_graceful_close());
        assert!(StopReason::MaxSteps.triggers_graceful_close());
        assert!(StopReason::BudgetExceeded.triggers_graceful_close());
        assert!(StopReason::ContextFull.triggers_graceful_close());
        assert!(StopReason::Timeout.triggers_graceful_close());
        assert!(StopReason::UserInterrupt.triggers_graceful_close());
    }

    #[test]
    fn agent_state_starts_running_with_seed_messages() {
        let state = AgentState::new("system", "hello");
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.status, AgentStatus::Running);
        assert!(!state.is_finished());
    }

    #[test]
    fn finish_success_sets_llm_done() {
        let mut state = AgentState::new("sys", "hi");
        state.finish_success("done");
        assert!(state.is_finished());
        assert_eq!(state.status, AgentStatus::Success);
        assert_eq!(state.stop_reason, Some(StopReason::LlmDone));
        assert_eq!(state.final_output.as_deref(), Some("done"));
    }

    #[test]
    fn finish_partial_sets_reason_and_status() {
        let mut state = AgentState::new("sys", "hi");
        state.finish_partial(StopReason::MaxSteps, "ran out of steps");
        assert_eq!(state.status, AgentStatus::Partial);
        assert_eq!(state.stop_reason, Some(StopReason::MaxSteps));
    }

    #[test]
    fn terminal_status_is_set_exactly_once_by_convention() {
        let mut state = AgentState::new("sys", "hi");
        assert!(!state.status.is_terminal());
        state.finish_success("done");
        assert!(state.status.is_terminal());
    }
}
