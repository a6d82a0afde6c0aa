//! Read file tool — reads a file with line numbers (`cat -n` style).

use std::fmt::Write;

use architect_core::ToolResult;
use architect_workspace::validate_path;
use serde_json::Value;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Default maximum lines returned per call.
const DEFAULT_LINE_LIMIT: usize = 2000;
/// Maximum characters per displayed line before truncation.
const MAX_LINE_LENGTH: usize = 2000;

/// Built-in tool for reading files.
pub struct ReadFileTool;

#[async_trait::async_trait]
impl BuiltinTool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Reads a file from the filesystem. Returns contents with line numbers \
         (cat -n format). Default reads up to 2000 lines. Use offset and \
         limit for large files. Lines longer than 2000 characters are \
         truncated."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to read, relative to the workspace root"
                },
                "offset": {
                    "type": "integer",
                    "description": "Line number to start reading from (1-based). Only provide for large files."
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of lines to read. Only provide for large files."
                }
            },
            "required": ["file_path"],
            "additionalProperties": false
        })
    }

    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("arguments must be an object".into())
        })?;
        for key in obj.keys() {
            if !["file_path", "offset", "limit"].contains(&key.as_str()) {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        if !obj.get("file_path").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("file_path is required".into()));
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let Some(file_path) = args.get("file_path").and_then(Value::as_str) else {
            return ToolResult::fail("file_path is required");
        };

        let resolved = match validate_path(std::path::Path::new(file_path), &ctx.workspace) {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(format!("path traversal rejected: {e}")),
        };

        let offset = args
            .get("offset")
            .and_then(Value::as_u64)
            .map(|v| usize::try_from(v).unwrap_or(usize::MAX));
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_LINE_LIMIT, |v| usize::try_from(v).unwrap_or(usize::MAX));

        if !resolved.exists() {
            return ToolResult::fail(format!("path not found: {file_path}"));
        }

        let raw = match tokio::fs::read(&resolved).await {
            Ok(bytes) => bytes,
            Err(e) => return ToolResult::fail(format!("I/O error reading {file_path}: {e}")),
        };

        let check_len = raw.len().min(8192);
        if raw[..check_len].contains(&0) {
            return ToolResult::fail(format!("{file_path} appears to be a binary file"));
        }

        let content = match String::from_utf8(raw) {
            Ok(s) => s,
            Err(_) => return ToolResult::fail(format!("{file_path} is not valid UTF-8")),
        };

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        let start = offset.map_or(0, |o| o.saturating_sub(1));
        let end = start.saturating_add(limit).min(total_lines);

        if start >= total_lines {
            return ToolResult::ok(format!(
                "(file has {total_lines} lines, offset {start} is past end)"
            ));
        }

        let mut output = String::new();
        for (idx, &line) in lines[start..end].iter().enumerate() {
            let line_num = start + idx + 1;
            let display_line = if line.len() > MAX_LINE_LENGTH {
                &line[..MAX_LINE_LENGTH]
            } else {
                line
            };
            let _ = writeln!(output, "{line_num:>6}\t{display_line}");
        }

        if end < total_lines {
            let _ = write!(
                output,
                "\n(showing lines {}-{end} of {total_lines}; use offset/limit for more)",
                start + 1
            );
        }

        ToolResult::ok(crate::truncate_output(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_workspace::WorkspaceConfig;
    use std::io::Write as IoWrite;
    use tempfile::TempDir;

    fn ctx(root: &std::path::Path) -> ToolContext {
        ToolContext::new(WorkspaceConfig::new(root))
    }

    #[tokio::test]
    async fn reads_file_with_line_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "line one").unwrap();
        writeln!(f, "line two").unwrap();

        let result = ReadFileTool
            .execute(serde_json::json!({"file_path": "a.txt"}), &ctx(dir.path()))
            .await;

        assert!(result.success);
        assert!(result.output.contains("line one"));
        assert!(result.output.contains("     1\t"));
    }

    #[tokio::test]
    async fn missing_file_is_reported_as_failure() {
        let dir = TempDir::new().unwrap();
        let result = ReadFileTool
            .execute(serde_json::json!({"file_path": "missing.txt"}), &ctx(dir.path()))
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn offset_and_limit_window_the_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        for i in 1..=20 {
            writeln!(f, "line {i}").unwrap();
        }

        let result = ReadFileTool
            .execute(
                serde_json::json!({"file_path": "a.txt", "offset": 5, "limit": 3}),
                &ctx(dir.path()),
            )
            .await;

        assert!(result.output.contains("line 5"));
        assert!(result.output.contains("line 7"));
        assert!(!result.output.contains("line 8"));
    }

    #[tokio::test]
    async fn binary_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.dat");
        std::fs::write(&path, [0x00, 0x01, 0x02, 0xFF]).unwrap();

        let result = ReadFileTool
            .execute(serde_json::json!({"file_path": "bin.dat"}), &ctx(dir.path()))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("binary"));
    }

    #[test]
    fn validate_args_rejects_unknown_field() {
        let err = ReadFileTool
            .validate_args(serde_json::json!({"file_path": "a.txt", "bogus": 1}))
            .unwrap_err();
        assert!(matches!(err, ToolError::UnknownField(_)));
    }
}
