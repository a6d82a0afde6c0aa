//! Dry-Run Tracker: when a run is started with dry-run enabled, write-like
//! tool calls are recorded here instead of touching the workspace.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One write-like tool call that was recorded instead of executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    pub tool_name: String,
    pub target_path: Option<String>,
    pub args: serde_json::Value,
}

/// Accumulates [`PlannedAction`]s across a dry-run. Shared by reference
/// across concurrent tool-call workers (§4.11 parallel tool calls).
#[derive(Debug, Default)]
pub struct DryRunTracker {
    planned: Mutex<Vec<PlannedAction>>,
}

impl DryRunTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, tool_name: impl Into<String>, target_path: Option<String>, args: serde_json::Value) {
        self.planned.lock().await.push(PlannedAction { tool_name: tool_name.into(), target_path, args });
    }

    pub async fn planned_actions(&self) -> Vec<PlannedAction> {
        self.planned.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_lists_planned_actions() {
        let tracker = DryRunTracker::new();
        tracker.record("write_file", Some("new.txt".to_string()), serde_json::json!({"content": "hi"})).await;
        let actions = tracker.planned_actions().await;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tool_name, "write_file");
        assert_eq!(actions[0].target_path.as_deref(), Some("new.txt"));
    }
}
