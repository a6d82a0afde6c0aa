//! The Parallel Runner driver (§4.14): fans independent agent runs out into
//! separate git worktrees, bounded by a worker count.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use architect_llm::LlmProvider;
use architect_runtime::AgentLoop;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::ParallelResult;
use crate::worktree::WorkerWorktree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub branch: String,
    pub model: String,
    pub status: WorkerStatus,
    pub steps: usize,
    pub cost: f64,
    pub duration_seconds: f64,
    pub files_modified: Vec<PathBuf>,
    pub worktree_path: PathBuf,
}

/// Builds a fresh `AgentLoop` rooted at a given worktree for a given model.
/// Constructing an `AgentLoop` means building a `ToolContext` scoped to
/// that worktree plus the guardrails/registry stack around it, which only
/// the caller (`architect-cli`) has enough context to assemble; this crate
/// only drives the fan-out and worktree lifecycle.
pub trait AgentLoopFactory<P: LlmProvider>: Send + Sync {
    fn build(&self, worktree_path: &std::path::Path, model: &str) -> Arc<AgentLoop<P>>;
}

impl<P, F> AgentLoopFactory<P> for F
where
    P: LlmProvider,
    F: Fn(&std::path::Path, &str) -> Arc<AgentLoop<P>> + Send + Sync,
{
    fn build(&self, worktree_path: &std::path::Path, model: &str) -> Arc<AgentLoop<P>> {
        self(worktree_path, model)
    }
}

pub struct ParallelRunner<P: LlmProvider> {
    repo_root: PathBuf,
    worker_count: usize,
    factory: Arc<dyn AgentLoopFactory<P>>,
}

impl<P: LlmProvider + 'static> ParallelRunner<P> {
    #[must_use]
    pub fn new(repo_root: PathBuf, worker_count: usize, factory: Arc<dyn AgentLoopFactory<P>>) -> Self {
        Self { repo_root, worker_count: worker_count.max(1), factory }
    }

    /// Runs every task to completion, up to `worker_count` concurrently.
    /// Models are assigned round-robin when shorter than the task list; if
    /// `models` is empty, `default_model` is used for every task. Worker
    /// failures are recorded, not propagated: peers keep running, and
    /// results come back in task-list order regardless of completion order.
    pub async fn run(
        &self,
        tasks: Vec<String>,
        models: &[String],
        default_model: &str,
    ) -> ParallelResult<Vec<WorkerResult>> {
        let repo_root = self.repo_root.clone();
        let factory = Arc::clone(&self.factory);
        let models = models.to_vec();
        let default_model = default_model.to_string();

        let jobs = tasks.into_iter().enumerate().map(|(worker_id, task)| {
            let repo_root = repo_root.clone();
            let factory = Arc::clone(&factory);
            let model = if models.is_empty() {
                default_model.clone()
            } else {
                models[worker_id % models.len()].clone()
            };
            async move { run_one(repo_root, worker_id, task, model, factory).await }
        });

        let results = stream::iter(jobs).buffer_unordered(self.worker_count).collect::<Vec<_>>().await;

        let mut by_id: std::collections::HashMap<usize, WorkerResult> =
            results.into_iter().map(|r| (r.worker_id, r)).collect();
        let mut ordered = Vec::with_capacity(by_id.len());
        let mut ids: Vec<usize> = by_id.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(result) = by_id.remove(&id) {
                ordered.push(result);
            }
        }
        Ok(ordered)
    }
}

async fn run_one<P: LlmProvider>(
    repo_root: PathBuf,
    worker_id: usize,
    task: String,
    model: String,
    factory: Arc<dyn AgentLoopFactory<P>>,
) -> WorkerResult {
    let start = Instant::now();

    let worktree = match tokio::task::spawn_blocking({
        let repo_root = repo_root.clone();
        move || WorkerWorktree::create(&repo_root, worker_id)
    })
    .await
    {
        Ok(Ok(worktree)) => worktree,
        Ok(Err(e)) => {
            tracing::warn!(worker = worker_id, error = %e, "failed to create worktree");
            return failed_result(worker_id, String::new(), model, start);
        }
        Err(e) => {
            tracing::warn!(worker = worker_id, error = %e, "worktree creation task panicked");
            return failed_result(worker_id, String::new(), model, start);
        }
    };

    let agent_loop = factory.build(&worktree.path, &model);
    let run_result = agent_loop.run(task, format!("parallel-{worker_id}"), None).await;

    match run_result {
        Ok(outcome) => WorkerResult {
            worker_id,
            branch: worktree.branch.clone(),
            model,
            status: WorkerStatus::Success,
            steps: outcome.state.steps.len(),
            cost: outcome.session.total_cost,
            duration_seconds: start.elapsed().as_secs_f64(),
            files_modified: outcome.session.files_modified.into_iter().collect(),
            worktree_path: worktree.path,
        },
        Err(e) => {
            tracing::warn!(worker = worker_id, error = %e, "worker agent loop failed");
            failed_result(worker_id, worktree.branch, model, start)
        }
    }
}

fn failed_result(worker_id: usize, branch: String, model: String, start: Instant) -> WorkerResult {
    WorkerResult {
        worker_id,
        branch,
        model,
        status: WorkerStatus::Failed,
        steps: 0,
        cost: 0.0,
        duration_seconds: start.elapsed().as_secs_f64(),
        files_modified: Vec::new(),
        worktree_path: PathBuf::new(),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn round_robin_indexing_wraps() {
        let models = ["a".to_string(), "b".to_string()];
        let assigned: Vec<&str> = (0..5).map(|i| models[i % models.len()].as_str()).collect();
        assert_eq!(assigned, vec!["a", "b", "a", "b", "a"]);
    }
}
