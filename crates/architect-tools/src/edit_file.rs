//! Edit file tool — performs exact string replacements in files.

use architect_core::ToolResult;
use architect_workspace::validate_path;
use serde_json::Value;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Built-in tool for editing files via string replacement.
pub struct EditFileTool;

#[async_trait::async_trait]
impl BuiltinTool for EditFileTool {
    fn name(&self) -> &'static str {
        "edit_file"
    }

    fn description(&self) -> &'static str {
        "Performs exact string replacements in a file. old_string must be \
         unique in the file unless replace_all is set. Fails if old_string \
         is not found or matches multiple times without replace_all."
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
                    "description": "Path to the file to edit, relative to the workspace root"
                },
                "old_string": {
                    "type": "string",
                    "description": "The exact text to find and replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "The replacement text"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace all occurrences (default: false)"
                }
            },
            "required": ["file_path", "old_string", "new_string"],
            "additionalProperties": false
        })
    }

    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("arguments must be an object".into())
        })?;
        for key in obj.keys() {
            if !["file_path", "old_string", "new_string", "replace_all"].contains(&key.as_str()) {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        for field in ["file_path", "old_string", "new_string"] {
            if !obj.get(field).is_some_and(Value::is_string) {
                return Err(ToolError::InvalidArguments(format!("{field} is required")));
            }
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let (Some(file_path), Some(old_string), Some(new_string)) = (
            args.get("file_path").and_then(Value::as_str),
            args.get("old_string").and_then(Value::as_str),
            args.get("new_string").and_then(Value::as_str),
        ) else {
            return ToolResult::fail("file_path, old_string, and new_string are required");
        };
        let replace_all = args.get("replace_all").and_then(Value::as_bool).unwrap_or(false);

        let resolved = match validate_path(std::path::Path::new(file_path), &ctx.workspace) {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(format!("path traversal rejected: {e}")),
        };

        if !resolved.exists() {
            return ToolResult::fail(format!("path not found: {file_path}"));
        }

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(e) => return ToolResult::fail(format!("I/O error reading {file_path}: {e}")),
        };

        let count = content.matches(old_string).count();
        if count == 0 {
            return ToolResult::fail(format!("old_string not found in {file_path}"));
        }
        if count > 1 && !replace_all {
            return ToolResult::fail(format!(
                "old_string found {count} times in {file_path} — use replace_all or provide \
                 more context to make it unique"
            ));
        }

        let new_content = if replace_all {
            content.replace(old_string, new_string)
        } else {
            content.replacen(old_string, new_string, 1)
        };

        if ctx.dry_run {
            return ToolResult::ok(format!("[DRY-RUN] would edit {file_path}"));
        }

        if let Err(e) = tokio::fs::write(&resolved, &new_content).await {
            return ToolResult::fail(format!("I/O error writing {file_path}: {e}"));
        }

        if replace_all && count > 1 {
            ToolResult::ok(format!("Replaced {count} occurrences in {file_path}"))
        } else {
            ToolResult::ok(format!("Edited {file_path}"))
        }
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
    async fn replaces_unique_occurrence() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello world").unwrap();

        let result = EditFileTool
            .execute(
                serde_json::json!({"file_path": "a.txt", "old_string": "hello", "new_string": "goodbye"}),
                &ctx(dir.path()),
            )
            .await;

        assert!(result.success);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "goodbye world");
    }

    #[tokio::test]
    async fn fails_when_old_string_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello world").unwrap();

        let result = EditFileTool
            .execute(
                serde_json::json!({"file_path": "a.txt", "old_string": "foobar", "new_string": "baz"}),
                &ctx(dir.path()),
            )
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn fails_on_non_unique_without_replace_all() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "aaa bbb aaa").unwrap();

        let result = EditFileTool
            .execute(
                serde_json::json!({"file_path": "a.txt", "old_string": "aaa", "new_string": "ccc"}),
                &ctx(dir.path()),
            )
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("2 times"));
    }

    #[tokio::test]
    async fn replace_all_replaces_every_occurrence() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "aaa bbb aaa").unwrap();

        let result = EditFileTool
            .execute(
                serde_json::json!({
                    "file_path": "a.txt", "old_string": "aaa", "new_string": "ccc", "replace_all": true
                }),
                &ctx(dir.path()),
            )
            .await;

        assert!(result.output.contains("2 occurrences"));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "ccc bbb ccc");
    }
}
