//! Glob tool — finds files matching a glob pattern.

use std::fmt::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use architect_core::ToolResult;
use architect_workspace::validate_path;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Built-in tool for finding files by glob pattern.
pub struct GlobTool;

#[async_trait::async_trait]
impl BuiltinTool for GlobTool {
    fn name(&self) -> &'static str {
        "glob"
    }

    fn description(&self) -> &'static str {
        "Finds files matching a glob pattern (e.g. \"**/*.rs\", \"src/**/*.ts\"). \
         Returns matching file paths sorted by modification time (most recent first)."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob pattern to match files against"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in, relative to the workspace root (defaults to the root)"
                }
            },
            "required": ["pattern"],
            "additionalProperties": false
        })
    }

    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        let obj = raw.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("arguments must be an object".into())
        })?;
        for key in obj.keys() {
            if !["pattern", "path"].contains(&key.as_str()) {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        if !obj.get("pattern").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("pattern is required".into()));
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let Some(pattern) = args.get("pattern").and_then(Value::as_str) else {
            return ToolResult::fail("pattern is required");
        };

        let search_dir = match args.get("path").and_then(Value::as_str) {
            Some(p) => match validate_path(std::path::Path::new(p), &ctx.workspace) {
                Ok(resolved) => resolved,
                Err(e) => return ToolResult::fail(format!("path traversal rejected: {e}")),
            },
            None => ctx.workspace.root.clone(),
        };

        if !search_dir.exists() {
            return ToolResult::fail(format!("path not found: {}", search_dir.display()));
        }

        let glob = match globset::GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
        {
            Ok(g) => g.compile_matcher(),
            Err(e) => return ToolResult::fail(format!("invalid glob pattern: {e}")),
        };

        let mut matches: Vec<(PathBuf, SystemTime)> = Vec::new();

        for entry in WalkDir::new(&search_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || e.file_name().to_str().is_none_or(|s| !s.starts_with('.'))
            })
        {
            let Ok(entry) = entry else { continue };
            if entry.file_type().is_dir() {
                continue;
            }

            let rel_path = entry.path().strip_prefix(&search_dir).unwrap_or(entry.path());
            if glob.is_match(rel_path) {
                let mtime = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                matches.push((entry.path().to_path_buf(), mtime));
            }
        }

        matches.sort_by(|a, b| b.1.cmp(&a.1));

        if matches.is_empty() {
            return ToolResult::ok(format!("No files matching \"{pattern}\" found"));
        }

        let mut output = String::new();
        for (path, _) in &matches {
            output.push_str(&path.display().to_string());
            output.push('\n');
        }
        let _ = write!(output, "\n({} files matched)", matches.len());

        ToolResult::ok(crate::truncate_output(output))
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
    async fn matches_by_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.rs"), "").unwrap();
        std::fs::write(dir.path().join("b.rs"), "").unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();

        let result = GlobTool
            .execute(serde_json::json!({"pattern": "*.rs"}), &ctx(dir.path()))
            .await;

        assert!(result.output.contains("a.rs"));
        assert!(result.output.contains("b.rs"));
        assert!(!result.output.contains("c.txt"));
        assert!(result.output.contains("2 files matched"));
    }

    #[tokio::test]
    async fn recursive_pattern_finds_nested_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/sub")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/sub/lib.rs"), "").unwrap();

        let result = GlobTool
            .execute(serde_json::json!({"pattern": "**/*.rs"}), &ctx(dir.path()))
            .await;

        assert!(result.output.contains("main.rs"));
        assert!(result.output.contains("lib.rs"));
    }

    #[tokio::test]
    async fn no_matches_reports_clearly() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();

        let result = GlobTool
            .execute(serde_json::json!({"pattern": "*.rs"}), &ctx(dir.path()))
            .await;

        assert!(result.output.contains("No files matching"));
    }

    #[tokio::test]
    async fn skips_hidden_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/config"), "").unwrap();
        std::fs::write(dir.path().join("visible.rs"), "").unwrap();

        let result = GlobTool
            .execute(serde_json::json!({"pattern": "**/*"}), &ctx(dir.path()))
            .await;

        assert!(result.output.contains("visible.rs"));
        assert!(!result.output.contains(".git"));
    }

    #[tokio::test]
    async fn invalid_pattern_is_reported_as_failure() {
        let dir = TempDir::new().unwrap();
        let result = GlobTool
            .execute(serde_json::json!({"pattern": "[invalid"}), &ctx(dir.path()))
            .await;

        assert!(!result.success);
    }
}
