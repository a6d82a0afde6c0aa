//! Git worktree allocation for fan-out workers (§4.14): a `git worktree
//! add -b <branch>` shell-out per worker.
//!
//! Deliberately does not auto-remove the worktree on drop: a worker's
//! branch and working tree need to survive for inspection after the run
//! finishes. Only [`cleanup_worktrees`] removes them.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ParallelError, ParallelResult};

pub const WORKTREE_PREFIX: &str = ".architect-parallel-";

#[derive(Debug, Clone)]
pub struct WorkerWorktree {
    pub repo_root: PathBuf,
    pub path: PathBuf,
    pub branch: String,
}

impl WorkerWorktree {
    /// Creates a new worktree and branch named `<prefix><worker_id>` under
    /// `repo_root/.architect-parallel-<worker_id>`.
    pub fn create(repo_root: &Path, worker_id: usize) -> ParallelResult<Self> {
        let branch = format!("architect-parallel-{worker_id}");
        let path = repo_root.join(format!("{WORKTREE_PREFIX}{worker_id}"));

        let output = Command::new("git")
            .current_dir(repo_root)
            .args(["worktree", "add", "-b", &branch])
            .arg(&path)
            .output()?;

        if !output.status.success() {
            return Err(ParallelError::GitFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }

        tracing::info!(worker = worker_id, path = %path.display(), "created parallel worktree");
        Ok(Self { repo_root: repo_root.to_path_buf(), path, branch })
    }
}

/// Removes every worktree directory under `repo_root` matching the
/// `.architect-parallel-*` prefix, then prunes stale worktree metadata.
/// Intended to be invoked explicitly (a CLI `parallel cleanup` command),
/// not automatically, since worktrees are left in place after a run for
/// inspection.
pub fn cleanup_worktrees(repo_root: &Path) -> ParallelResult<usize> {
    let mut removed = 0usize;

    let entries = match std::fs::read_dir(repo_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(WORKTREE_PREFIX) {
            continue;
        }
        let path = entry.path();
        let status = Command::new("git")
            .current_dir(repo_root)
            .args(["worktree", "remove", "--force"])
            .arg(&path)
            .status()?;
        if status.success() {
            removed += 1;
        } else {
            tracing::warn!(path = %path.display(), "failed to remove worktree cleanly, leaving in place");
        }
    }

    let _ = Command::new("git").current_dir(repo_root).args(["worktree", "prune"]).status();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo(dir: &Path) {
        let run = |args: &[&str]| {
            assert!(Command::new("git").current_dir(dir).args(args).status().unwrap().success());
        };
        run(&["init", "-q"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "Test"]);
        std::fs::write(dir.join("README.md"), "hello\n").unwrap();
        run(&["add", "-A"]);
        run(&["commit", "-q", "-m", "initial"]);
    }

    #[test]
    fn create_and_cleanup_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());

        let worktree = WorkerWorktree::create(dir.path(), 0).unwrap();
        assert!(worktree.path.exists());
        assert_eq!(worktree.branch, "architect-parallel-0");

        let removed = cleanup_worktrees(dir.path()).unwrap();
        assert_eq!(removed, 1);
        assert!(!worktree.path.exists());
    }

    #[test]
    fn cleanup_on_missing_repo_root_is_a_noop() {
        let removed = cleanup_worktrees(Path::new("/nonexistent/path/for/test")).unwrap();
        assert_eq!(removed, 0);
    }
}
