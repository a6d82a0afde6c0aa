//! Executes one Ralph Loop `check` command: a fixed-timeout shell
//! subprocess with its combined stdout/stderr capped to 2,000 characters.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;

const MAX_OUTPUT_CHARS: usize = 2_000;

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub command: String,
    pub passed: bool,
    pub output: String,
}

pub async fn run_check(command: &str, cwd: &Path, timeout: Duration) -> CheckOutcome {
    let spawn = Command::new("sh").arg("-c").arg(command).current_dir(cwd).output();

    match tokio::time::timeout(timeout, spawn).await {
        Ok(Ok(output)) => {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            CheckOutcome {
                command: command.to_string(),
                passed: output.status.success(),
                output: truncate_tail(&combined, MAX_OUTPUT_CHARS),
            }
        }
        Ok(Err(e)) => CheckOutcome {
            command: command.to_string(),
            passed: false,
            output: format!("failed to run check: {e}"),
        },
        Err(_) => CheckOutcome {
            command: command.to_string(),
            passed: false,
            output: format!("check timed out after {}s", timeout.as_secs()),
        },
    }
}

/// Keeps the last `max_chars` characters, since failing-check output is
/// usually most informative at the tail (the final error, not the setup
/// noise before it).
fn truncate_tail(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        return s.to_string();
    }
    let skip = total - max_chars;
    let tail: String = s.chars().skip(skip).collect();
    format!("...(truncated)...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passing_check_is_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = run_check("echo hello", tmp.path(), Duration::from_secs(5)).await;
        assert!(outcome.passed);
        assert!(outcome.output.contains("hello"));
    }

    #[tokio::test]
    async fn failing_check_is_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = run_check("exit 1", tmp.path(), Duration::from_secs(5)).await;
        assert!(!outcome.passed);
    }

    #[tokio::test]
    async fn slow_check_times_out() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = run_check("sleep 5", tmp.path(), Duration::from_millis(50)).await;
        assert!(!outcome.passed);
        assert!(outcome.output.contains("timed out"));
    }

    #[test]
    fn truncation_keeps_the_tail() {
        let long = "a".repeat(3_000) + "END";
        let truncated = truncate_tail(&long, 2_000);
        assert!(truncated.ends_with("END"));
        assert!(truncated.len() < long.len());
    }
}
