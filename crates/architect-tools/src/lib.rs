//! Tool Registry and built-in tools.
//!
//! Tools are modeled as implementations of a small capability set: validate
//! args, execute, expose schema, declare sensitivity (§4.1, §9). They never
//! raise — failures come back as a [`ToolResult`] the Execution Engine can
//! hand to the LLM.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod edit_file;
pub mod error;
pub mod glob_tool;
pub mod grep;
pub mod list_directory;
pub mod read_file;
pub mod registry;
pub mod run_command;
pub mod write_file;

pub use architect_core::ToolResult;
pub use edit_file::EditFileTool;
pub use error::{ToolError, ValidatedArgs};
pub use glob_tool::GlobTool;
pub use grep::GrepTool;
pub use list_directory::ListDirectoryTool;
pub use read_file::ReadFileTool;
pub use registry::{BuiltinTool, ToolContext, ToolRegistry};
pub use run_command::{classify_command, CommandClass, RunCommandTool};
pub use write_file::WriteFileTool;

/// Maximum tool output size in characters before truncation, distinct
/// from the Context Manager's token-based Level 1 truncation (this one
/// guards a single tool's raw output before it ever reaches the agent
/// loop).
pub const MAX_OUTPUT_CHARS: usize = 30_000;

/// Truncate `output` to [`MAX_OUTPUT_CHARS`], appending a notice if cut.
#[must_use]
pub fn truncate_output(output: String) -> String {
    if output.len() <= MAX_OUTPUT_CHARS {
        return output;
    }
    let mut truncated = truncate_at_char_boundary(&output, MAX_OUTPUT_CHARS);
    truncated.push_str("\n\n... (output truncated — exceeded 30000 character limit)");
    truncated
}

/// Truncate a string at the nearest char boundary at or before `max_bytes`.
#[must_use]
pub fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_output_small_unchanged() {
        let small = "hello".to_string();
        assert_eq!(truncate_output(small.clone()), small);
    }

    #[test]
    fn truncate_output_large_is_cut() {
        let large = "x".repeat(40_000);
        let result = truncate_output(large);
        assert!(result.len() < 40_000);
        assert!(result.contains("output truncated"));
    }

    #[test]
    fn truncate_at_char_boundary_avoids_splitting_multibyte() {
        let mut s = "x".repeat(198);
        s.push('🦀');
        let result = truncate_at_char_boundary(&s, 200);
        assert_eq!(result, "x".repeat(198));
    }
}
