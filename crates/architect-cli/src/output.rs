//! Stdout/stderr discipline helpers (§6): the final result always goes to
//! stdout so `architect run ... | jq` style piping works; everything else
//! (progress, warnings, summaries) goes to stderr.

use architect_report::ReportData;

/// Prints the plain-text final result to stdout.
pub fn print_result(output: &str) {
    println!("{output}");
}

/// A one-line human summary of a non-success run, for stderr.
pub fn status_summary(report: &ReportData) -> String {
    let reason = report.stop_reason.map(|r| format!("{r:?}")).unwrap_or_else(|| "none".to_string());
    format!("run finished with status {:?} (stop reason: {reason}) after {} step(s)", report.status, report.steps_completed)
}
