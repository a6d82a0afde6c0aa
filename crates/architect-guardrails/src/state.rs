//! Per-run state accumulated by the Guardrails Engine for `check_edit_limits`
//! and `max_commands_per_run`. Reset between runs.

use std::collections::HashSet;
use std::path::PathBuf;

/// Cumulative counters carried within a single agent run.
#[derive(Debug, Clone, Default)]
pub struct GuardrailState {
    pub files_modified: HashSet<PathBuf>,
    pub lines_changed: usize,
    pub commands_executed: usize,
}

impl GuardrailState {
    /// Fresh state for a new run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write/edit touching `path`, adding `lines` to the running
    /// total.
    pub fn record_file_touch(&mut self, path: PathBuf, lines: usize) {
        self.files_modified.insert(path);
        self.lines_changed = self.lines_changed.saturating_add(lines);
    }

    /// Record one command dispatch.
    pub fn record_command(&mut self) {
        self.commands_executed = self.commands_executed.saturating_add(1);
    }

    /// Reset all counters for a new run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
