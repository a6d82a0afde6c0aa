//! Git-backed restore points (§4.15). Every checkpoint is an ordinary
//! commit whose subject is prefixed `architect:checkpoint`, so `list()` is
//! just a `git log --grep` parse and `rollback()` is a `git reset --hard`.
//!
//! These are blocking `std::process::Command` calls; callers on the async
//! Agent Loop should run them via `tokio::task::spawn_blocking`.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};

use crate::error::{CheckpointError, CheckpointResult};

const PREFIX: &str = "architect:checkpoint";
/// ASCII unit separator: unlikely to appear in a step name or message, so
/// it is safe to split `git log` output on without a message ever
/// corrupting the parse the way a colon or space could.
const FIELD_SEP: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub commit_id: String,
    pub step_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CheckpointManager {
    repo_root: PathBuf,
}

impl CheckpointManager {
    #[must_use]
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self { repo_root: repo_root.into() }
    }

    /// Stage all current changes and commit them as a checkpoint. Returns
    /// `Ok(None)` if there was nothing to stage (no-op, not an error).
    pub fn create(&self, step_name: &str, message: &str) -> CheckpointResult<Option<String>> {
        self.git(["add", "-A"])?;

        let nothing_staged = Command::new("git")
            .current_dir(&self.repo_root)
            .args(["diff", "--quiet", "--cached", "--", "."])
            .status()?
            .success();
        if nothing_staged {
            return Ok(None);
        }

        let subject = format!("{PREFIX} {step_name}: {message}");
        self.git(["commit", "-m", &subject])?;
        let commit_id = self.git(["rev-parse", "HEAD"])?.trim().to_string();
        tracing::info!(step = step_name, commit = %commit_id, "checkpoint created");
        Ok(Some(commit_id))
    }

    /// List all checkpoints, oldest first.
    pub fn list(&self) -> CheckpointResult<Vec<Checkpoint>> {
        let format = format!("--format=%H{FIELD_SEP}%s{FIELD_SEP}%cI");
        let grep = format!("--grep={PREFIX}");
        let output = self.git(["log", &grep, &format])?;

        let mut checkpoints: Vec<Checkpoint> = output
            .lines()
            .filter(|l| !l.is_empty())
            .map(parse_log_line)
            .collect::<CheckpointResult<Vec<_>>>()?;
        checkpoints.reverse();
        Ok(checkpoints)
    }

    /// Hard-reset the repository to a checkpoint, matched by step name
    /// (most recent wins) or literal commit id. Destructive.
    pub fn rollback(&self, target: &str) -> CheckpointResult<()> {
        let commit_id = self.resolve(target)?;
        self.git(["reset", "--hard", &commit_id])?;
        tracing::warn!(target, commit = %commit_id, "rolled back to checkpoint");
        Ok(())
    }

    /// Whether the working tree differs from `commit_id`.
    pub fn has_changes_since(&self, commit_id: &str) -> CheckpointResult<bool> {
        let unchanged = Command::new("git")
            .current_dir(&self.repo_root)
            .args(["diff", "--quiet", commit_id, "--", "."])
            .status()?
            .success();
        Ok(!unchanged)
    }

    fn resolve(&self, target: &str) -> CheckpointResult<String> {
        let by_step = self
            .list()?
            .into_iter()
            .rev()
            .find(|c| c.step_name == target)
            .map(|c| c.commit_id);
        if let Some(commit_id) = by_step {
            return Ok(commit_id);
        }

        let is_commit = Command::new("git")
            .current_dir(&self.repo_root)
            .args(["cat-file", "-e", target])
            .status()?
            .success();
        if is_commit {
            return Ok(target.to_string());
        }
        Err(CheckpointError::NotFound(target.to_string()))
    }

    fn git<I, S>(&self, args: I) -> CheckpointResult<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let output = Command::new("git").current_dir(&self.repo_root).args(args).output()?;
        if !output.status.success() {
            return Err(CheckpointError::GitFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_log_line(line: &str) -> CheckpointResult<Checkpoint> {
    let mut fields = line.splitn(3, FIELD_SEP);
    let (Some(commit_id), Some(subject), Some(date)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(CheckpointError::UnparsableLogEntry(line.to_string()));
    };

    let rest = subject
        .strip_prefix(PREFIX)
        .map(str::trim_start)
        .ok_or_else(|| CheckpointError::UnparsableLogEntry(line.to_string()))?;
    let (step_name, message) = rest
        .split_once(':')
        .map(|(s, m)| (s.trim().to_string(), m.trim().to_string()))
        .unwrap_or_else(|| (rest.to_string(), String::new()));

    let timestamp = DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CheckpointError::UnparsableLogEntry(line.to_string()))?;

    Ok(Checkpoint { commit_id: commit_id.to_string(), step_name, message, timestamp })
}
