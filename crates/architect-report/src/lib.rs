//! Report Generator: turns a finished [`architect_core::AgentState`] plus
//! its cost ledger into the three result renderings the CLI exposes via
//! `--report {json,markdown,github}` (and the same JSON shape backs
//! `--json`).

#![deny(unsafe_code)]
#![warn(clippy::all)]

use std::fmt::Write as _;

use serde::Serialize;

use architect_core::state::{AgentState, AgentStatus, StopReason};
use architect_cost::CostTracker;

/// One tool invocation as it appears in a report's `tools_used` list.
#[derive(Debug, Clone, Serialize)]
pub struct ToolUsageEntry {
    pub step: usize,
    pub tool: String,
    pub success: bool,
}

/// Token/cost totals broken down by [`architect_cost::CostSource`].
#[derive(Debug, Clone, Serialize)]
pub struct CostSummary {
    pub total_cost_usd: f64,
    pub total_input_tokens: usize,
    pub total_output_tokens: usize,
    pub by_source: std::collections::BTreeMap<String, f64>,
}

/// Everything a report needs, independent of rendering format.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub status: AgentStatus,
    pub stop_reason: Option<StopReason>,
    pub output: String,
    pub steps_completed: usize,
    pub tools_used: Vec<ToolUsageEntry>,
    pub duration_seconds: f64,
    pub model: String,
    pub costs: Option<CostSummary>,
}

impl ReportData {
    /// Build from a finished run's state and its cost ledger. `model` and
    /// `duration_seconds` come from the caller since neither lives on
    /// `AgentState` itself.
    #[must_use]
    pub fn from_run(
        state: &AgentState,
        cost_tracker: Option<&CostTracker>,
        model: impl Into<String>,
        duration_seconds: f64,
    ) -> Self {
        let tools_used = state
            .steps
            .iter()
            .flat_map(|step| {
                step.tool_calls_made.iter().map(move |call| ToolUsageEntry {
                    step: step.step_number,
                    tool: call.tool_name.clone(),
                    success: call.result.success,
                })
            })
            .collect();

        let costs = cost_tracker.map(|tracker| {
            let (input_tokens, output_tokens) = tracker.total_tokens();
            let by_source = tracker
                .total_by_source()
                .into_iter()
                .map(|(source, cost)| (format!("{source:?}").to_lowercase(), cost))
                .collect();
            CostSummary {
                total_cost_usd: tracker.total_cost_usd(),
                total_input_tokens: input_tokens,
                total_output_tokens: output_tokens,
                by_source,
            }
        });

        Self {
            status: state.status,
            stop_reason: state.stop_reason,
            output: state.final_output.clone().unwrap_or_default(),
            steps_completed: state.steps.len(),
            tools_used,
            duration_seconds,
            model: model.into(),
            costs,
        }
    }

    /// Render as the JSON object shape used by both `--json` and
    /// `--report json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render as a human-readable Markdown report.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Architect run report");
        let _ = writeln!(out);
        let _ = writeln!(out, "- **Status**: {:?}", self.status);
        if let Some(reason) = self.stop_reason {
            let _ = writeln!(out, "- **Stop reason**: {reason:?}");
        }
        let _ = writeln!(out, "- **Model**: {}", self.model);
        let _ = writeln!(out, "- **Steps completed**: {}", self.steps_completed);
        let _ = writeln!(out, "- **Duration**: {:.1}s", self.duration_seconds);
        if let Some(costs) = &self.costs {
            let _ = writeln!(out, "- **Cost**: ${:.4}", costs.total_cost_usd);
            let _ = writeln!(
                out,
                "  - tokens: {} in / {} out",
                costs.total_input_tokens, costs.total_output_tokens
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "## Output");
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.output);

        if !self.tools_used.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Tools used");
            let _ = writeln!(out);
            let _ = writeln!(out, "| Step | Tool | Result |");
            let _ = writeln!(out, "|---|---|---|");
            for entry in &self.tools_used {
                let mark = if entry.success { "ok" } else { "failed" };
                let _ = writeln!(out, "| {} | {} | {} |", entry.step, entry.tool, mark);
            }
        }
        out
    }

    /// Render as a compact GitHub PR comment: a summary line plus a
    /// collapsible details block, so it reads well inline in a PR thread.
    #[must_use]
    pub fn to_github(&self) -> String {
        let emoji = match self.status {
            AgentStatus::Success => ":white_check_mark:",
            AgentStatus::Partial => ":warning:",
            AgentStatus::Failed => ":x:",
            AgentStatus::Running => ":hourglass:",
        };
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{emoji} **Architect** finished in {:.1}s ({} steps, model `{}`)",
            self.duration_seconds, self.steps_completed, self.model
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", self.output);
        let _ = writeln!(out);
        let _ = writeln!(out, "<details><summary>Details</summary>");
        let _ = writeln!(out);
        if let Some(reason) = self.stop_reason {
            let _ = writeln!(out, "- Stop reason: `{reason:?}`");
        }
        if let Some(costs) = &self.costs {
            let _ = writeln!(out, "- Cost: ${:.4}", costs.total_cost_usd);
        }
        if !self.tools_used.is_empty() {
            let _ = writeln!(out, "- Tools used:");
            for entry in &self.tools_used {
                let mark = if entry.success { "ok" } else { "failed" };
                let _ = writeln!(out, "  - step {}: `{}` ({mark})", entry.step, entry.tool);
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "</details>");
        out
    }
}

/// The three output formats the CLI's `--report` flag selects between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Github,
}

impl ReportData {
    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        Ok(match format {
            ReportFormat::Json => self.to_json()?,
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Github => self.to_github(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::state::{AgentState, ToolCallResult};
    use architect_core::message::{Message, ToolResult};
    use architect_cost::{CostSource, PriceTable, Usage};

    fn sample_state() -> AgentState {
        let mut state = AgentState::new("system prompt", "do the thing");
        state.steps.push(architect_core::state::StepResult {
            step_number: 0,
            llm_response: Message::assistant("working on it"),
            tool_calls_made: vec![ToolCallResult {
                tool_name: "read_file".to_string(),
                args: serde_json::json!({"file_path": "a.rs"}),
                result: ToolResult { success: true, output: "ok".into(), error: None },
                was_confirmed: false,
                was_dry_run: false,
                timestamp: chrono::Utc::now(),
            }],
            timestamp: chrono::Utc::now(),
        });
        state.finish_success("done".to_string());
        state
    }

    #[test]
    fn json_report_round_trips_through_serde() {
        let state = sample_state();
        let mut tracker = CostTracker::new(PriceTable::default());
        tracker.record(0, "test-model", Usage::new(100, 50), CostSource::Agent);

        let report = ReportData::from_run(&state, Some(&tracker), "test-model", 1.5);
        let json = report.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["steps_completed"], 1);
        assert_eq!(parsed["tools_used"][0]["tool"], "read_file");
    }

    #[test]
    fn markdown_report_includes_output_and_tools_table() {
        let state = sample_state();
        let report = ReportData::from_run(&state, None, "test-model", 0.5);
        let markdown = report.to_markdown();
        assert!(markdown.contains("## Output"));
        assert!(markdown.contains("read_file"));
        assert!(markdown.contains("done"));
    }

    #[test]
    fn github_report_picks_status_emoji() {
        let state = sample_state();
        let report = ReportData::from_run(&state, None, "test-model", 0.5);
        let comment = report.to_github();
        assert!(comment.contains(":white_check_mark:"));
        assert!(comment.contains("<details>"));
    }
}
