//! List directory tool — lists directory contents with type and size info.

use std::fmt::Write;

use architect_core::ToolResult;
use architect_workspace::validate_path;
use serde_json::Value;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Built-in tool for listing directory contents.
pub struct ListDirectoryTool;

#[async_trait::async_trait]
impl BuiltinTool for ListDirectoryTool {
    fn name(&self) -> &'static str {
        "list_directory"
    }

    fn description(&self) -> &'static str {
        "Lists the contents of a directory. Shows directories first, then files, \
         both sorted alphabetically. Includes type indicator and file sizes."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path to the directory to list, relative to the workspace root"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("arguments must be an object".into())
        })?;
        for key in obj.keys() {
            if key != "path" {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        if !obj.get("path").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("path is required".into()));
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let Some(dir_path) = args.get("path").and_then(Value::as_str) else {
            return ToolResult::fail("path is required");
        };

        let resolved = match validate_path(std::path::Path::new(dir_path), &ctx.workspace) {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(format!("path traversal rejected: {e}")),
        };

        if !resolved.exists() {
            return ToolResult::fail(format!("path not found: {dir_path}"));
        }
        if !resolved.is_dir() {
            return ToolResult::fail(format!("{dir_path} is not a directory"));
        }

        let mut dirs: Vec<String> = Vec::new();
        let mut files: Vec<String> = Vec::new();

        let mut entries = match tokio::fs::read_dir(&resolved).await {
            Ok(e) => e,
            Err(e) => return ToolResult::fail(format!("I/O error listing {dir_path}: {e}")),
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let name = entry.file_name().to_string_lossy().to_string();
                    let Ok(metadata) = entry.metadata().await else {
                        continue;
                    };
                    if metadata.is_dir() {
                        dirs.push(format!("  {name}/"));
                    } else {
                        files.push(format!("  {name}  ({})", format_size(metadata.len())));
                    }
                }
                Ok(None) => break,
                Err(e) => return ToolResult::fail(format!("I/O error listing {dir_path}: {e}")),
            }
        }

        dirs.sort();
        files.sort();

        let total = dirs.len().saturating_add(files.len());
        if total == 0 {
            return ToolResult::ok(format!("{dir_path} is empty"));
        }

        let mut output = String::new();
        for d in &dirs {
            output.push_str(d);
            output.push('\n');
        }
        for f in &files {
            output.push_str(f);
            output.push('\n');
        }
        let _ = write!(output, "\n({} directories, {} files)", dirs.len(), files.len());

        ToolResult::ok(crate::truncate_output(output))
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
