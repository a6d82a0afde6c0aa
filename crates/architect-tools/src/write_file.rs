//! Write file tool — writes content to a file, creating parent directories
//! as needed. Honors dry-run mode (Execution Engine step 6).

use architect_core::ToolResult;
use architect_workspace::validate_path;
use serde_json::Value;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Built-in tool for writing files.
pub struct WriteFileTool;

#[async_trait::async_trait]
impl BuiltinTool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Writes content to a file. Creates parent directories if they don't \
         exist. Overwrites the file if it already exists."
    }

    fn sensitive(&self) -> bool {
        true
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write, relative to the workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            },
            "required": ["file_path", "content"],
            "additionalProperties": false
        })
    }

    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("arguments must be an object".into())
        })?;
        for key in obj.keys() {
            if !["file_path", "content"].contains(&key.as_str()) {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        if !obj.get("file_path").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("file_path is required".into()));
        }
        if !obj.get("content").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("content is required".into()));
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let (Some(file_path), Some(content)) = (
            args.get("file_path").and_then(Value::as_str),
            args.get("content").and_then(Value::as_str),
        ) else {
            return ToolResult::fail("file_path and content are required");
        };

        let resolved = match validate_path(std::path::Path::new(file_path), &ctx.workspace) {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(format!("path traversal rejected: {e}")),
        };

        if ctx.dry_run {
            return ToolResult::ok(format!(
                "[DRY-RUN] would write {} bytes to {}",
                content.len(),
                resolved.display()
            ));
        }

        if let Some(parent) = resolved.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return ToolResult::fail(format!("failed to create parent directories: {e}"));
            }
        }

        if let Err(e) = tokio::fs::write(&resolved, content).await {
            return ToolResult::fail(format!("I/O error writing {file_path}: {e}"));
        }

        ToolResult::ok(format!("Wrote {} bytes to {file_path}", content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_workspace::WorkspaceConfig;
    use tempfile::TempDir;

    fn ctx(root: &std::path::Path) -> ToolContext {
        ToolContext::new(WorkspaceConfig::new(root))
    }

    #[tokio::test]
    async fn writes_file_and_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();

        let result = WriteFileTool
            .execute(
                serde_json::json!({"file_path": "a/b/c/test.txt", "content": "hello world"}),
                &ctx(dir.path()),
            )
            .await;

        assert!(result.success);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a/b/c/test.txt")).unwrap(),
            "hello world"
        );
    }

    #[tokio::test]
    async fn overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("test.txt"), "old").unwrap();

        WriteFileTool
            .execute(
                serde_json::json!({"file_path": "test.txt", "content": "new"}),
                &ctx(dir.path()),
            )
            .await;

        assert_eq!(std::fs::read_to_string(dir.path().join("test.txt")).unwrap(), "new");
    }

    #[tokio::test]
    async fn dry_run_does_not_write() {
        let dir = TempDir::new().unwrap();
        let result = WriteFileTool
            .execute(
                serde_json::json!({"file_path": "new.txt", "content": "hi"}),
                &ctx(dir.path()).dry_run(),
            )
            .await;

        assert!(result.success);
        assert!(result.output.starts_with("[DRY-RUN]"));
        assert!(!dir.path().join("new.txt").exists());
    }

    #[test]
    fn is_sensitive() {
        assert!(WriteFileTool.sensitive());
    }
}
