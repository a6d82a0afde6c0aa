//! Prompt assembly for a clean-context review (§4.16).

/// Appended to the reviewer's system prompt by the caller, which is also
/// responsible for restricting the reviewer's `AgentConfig::allowed_tools`
/// to read-only tools. Asks for a leading verdict line so
/// [`crate::result::parse_verdict`] can extract `has_issues` without a
/// structured-output round trip.
pub const REVIEW_INSTRUCTIONS: &str = "\
You are reviewing a code change with fresh eyes. You were not the one who \
wrote it and have no memory of how it was built; judge only the task and \
the diff given to you. Look for bugs, security issues, convention \
violations, and missing tests. Do not make any edits.

Start your reply with exactly one of these lines, then a blank line, then \
your review:
ISSUES: yes
ISSUES: no";

/// Builds the reviewer's task prompt from only `{task, diff}` — never the
/// builder agent's step history, per spec.
#[must_use]
pub fn build_task_prompt(task: &str, diff: &str) -> String {
    if diff.trim().is_empty() {
        format!("## Original task\n\n{task}\n\n## Diff\n\n(no changes)\n")
    } else {
        format!("## Original task\n\n{task}\n\n## Diff\n\n```diff\n{diff}\n```\n")
    }
}
