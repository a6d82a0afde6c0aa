//! Exit codes (§6): a closed set the CLI maps every terminal outcome onto,
//! so scripts invoking `architect` can branch without parsing stdout.

use architect_core::{AgentStatus, StopReason};

pub const SUCCESS: i32 = 0;
pub const FAILED: i32 = 1;
pub const PARTIAL: i32 = 2;
pub const CONFIG_ERROR: i32 = 3;
pub const AUTH_ERROR: i32 = 4;
pub const TIMEOUT: i32 = 5;
pub const INTERRUPTED: i32 = 130;

/// Classify a finished run's terminal status into an exit code, applying
/// the keyword-based auth-error detection and `--exit-code-on-partial`.
#[must_use]
pub fn from_run(status: AgentStatus, stop_reason: Option<StopReason>, output: &str, partial_override: Option<i32>) -> i32 {
    match status {
        AgentStatus::Success => SUCCESS,
        AgentStatus::Partial => match stop_reason {
            Some(StopReason::UserInterrupt) => INTERRUPTED,
            Some(StopReason::Timeout) => TIMEOUT,
            _ => partial_override.unwrap_or(PARTIAL),
        },
        AgentStatus::Failed => {
            if stop_reason == Some(StopReason::LlmError) && looks_like_auth_error(output) { AUTH_ERROR } else { FAILED }
        }
        AgentStatus::Running => FAILED,
    }
}

/// Keyword-based auth-error detection (§7): the LLM adapter surfaces
/// provider errors as plain text, so the CLI sniffs the message rather than
/// matching on a structured error kind it doesn't have.
fn looks_like_auth_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["unauthorized", "invalid api key", "authentication", "forbidden", "401", "403"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_zero() {
        assert_eq!(from_run(AgentStatus::Success, Some(StopReason::LlmDone), "", None), SUCCESS);
    }

    #[test]
    fn user_interrupt_maps_to_130() {
        assert_eq!(from_run(AgentStatus::Partial, Some(StopReason::UserInterrupt), "", None), INTERRUPTED);
    }

    #[test]
    fn timeout_maps_to_5() {
        assert_eq!(from_run(AgentStatus::Partial, Some(StopReason::Timeout), "", None), TIMEOUT);
    }

    #[test]
    fn auth_error_keyword_maps_to_4() {
        assert_eq!(from_run(AgentStatus::Failed, Some(StopReason::LlmError), "401 Unauthorized", None), AUTH_ERROR);
    }

    #[test]
    fn other_llm_error_maps_to_1() {
        assert_eq!(from_run(AgentStatus::Failed, Some(StopReason::LlmError), "connection reset", None), FAILED);
    }

    #[test]
    fn generic_partial_maps_to_2() {
        assert_eq!(from_run(AgentStatus::Partial, Some(StopReason::MaxSteps), "", None), PARTIAL);
    }

    #[test]
    fn partial_override_wins_over_default() {
        assert_eq!(from_run(AgentStatus::Partial, Some(StopReason::MaxSteps), "", Some(42)), 42);
    }
}
