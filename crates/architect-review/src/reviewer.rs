//! Drives one clean-context review turn (§4.16).

use architect_llm::LlmProvider;
use architect_runtime::{AgentLoop, RuntimeResult};

use crate::prompt::build_task_prompt;
use crate::result::{parse_verdict, ReviewResult};

/// Runs a reviewer `AgentLoop` against `{task, diff}` only. The caller is
/// expected to have already restricted this loop's `AgentConfig` to
/// read-only tools and to have appended [`crate::prompt::REVIEW_INSTRUCTIONS`]
/// to its system prompt; this crate does not mutate that configuration.
pub async fn review<P: LlmProvider>(agent_loop: &AgentLoop<P>, task: &str, diff: &str) -> RuntimeResult<ReviewResult> {
    let prompt = build_task_prompt(task, diff);
    let outcome = agent_loop.run(prompt, "review", None).await?;
    let raw_output = outcome.state.final_output.clone().unwrap_or_default();
    let (has_issues, review_text) = parse_verdict(&raw_output);

    Ok(ReviewResult { has_issues, review_text, cost: outcome.session.total_cost })
}

/// Turns a `has_issues = true` review into a remediation prompt for a
/// builder agent. Returns `None` when the review found nothing to fix.
#[must_use]
pub fn remediation_prompt(result: &ReviewResult) -> Option<String> {
    if !result.has_issues {
        return None;
    }
    Some(format!(
        "A review of your last change found issues to address:\n\n{}\n\nFix them.",
        result.review_text
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_issues_has_no_remediation_prompt() {
        let result = ReviewResult { has_issues: false, review_text: "looks good".to_string(), cost: 0.01 };
        assert!(remediation_prompt(&result).is_none());
    }

    #[test]
    fn issues_produce_a_remediation_prompt_containing_the_review() {
        let result = ReviewResult { has_issues: true, review_text: "missing a null check".to_string(), cost: 0.01 };
        let prompt = remediation_prompt(&result).unwrap();
        assert!(prompt.contains("missing a null check"));
    }
}
