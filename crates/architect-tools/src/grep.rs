//! Grep tool — searches file contents with regex.

use std::fmt::Write;
use std::path::Path;

use architect_core::ToolResult;
use architect_workspace::validate_path;
use regex::Regex;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::ToolError;
use crate::registry::{BuiltinTool, ToolContext};

/// Maximum number of matching files to report before stopping early.
const MAX_MATCHING_FILES: usize = 100;

/// Built-in tool for searching file contents.
pub struct GrepTool;

#[async_trait::async_trait]
impl BuiltinTool for GrepTool {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn description(&self) -> &'static str {
        "Searches file contents using regex. Supports context lines and file type \
         filtering. Returns matching lines in file:line:content format."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regex pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search in, relative to the workspace root (defaults to the root)"
                },
                "glob": {
                    "type": "string",
                    "description": "Glob to filter files (e.g. \"*.rs\", \"*.{ts,tsx}\")"
                },
                "context": {
                    "type": "integer",
                    "description": "Number of context lines to show before and after matches"
                },
                "case_insensitive": {
                    "type": "boolean",
                    "description": "Case insensitive search (default: false)"
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
            if !["pattern", "path", "glob", "context", "case_insensitive"].contains(&key.as_str()) {
                return Err(ToolError::UnknownField(key.clone()));
            }
        }
        if !obj.get("pattern").is_some_and(Value::is_string) {
            return Err(ToolError::InvalidArguments("pattern is required".into()));
        }
        Ok(raw)
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult {
        let Some(pattern_str) = args.get("pattern").and_then(Value::as_str) else {
            return ToolResult::fail("pattern is required");
        };

        let case_insensitive = args.get("case_insensitive").and_then(Value::as_bool).unwrap_or(false);
        let regex_pattern = if case_insensitive {
            format!("(?i){pattern_str}")
        } else {
            pattern_str.to_string()
        };

        let regex = match Regex::new(&regex_pattern) {
            Ok(r) => r,
            Err(e) => return ToolResult::fail(format!("invalid regex: {e}")),
        };

        let search_path = match args.get("path").and_then(Value::as_str) {
            Some(p) => match validate_path(std::path::Path::new(p), &ctx.workspace) {
                Ok(resolved) => resolved,
                Err(e) => return ToolResult::fail(format!("path traversal rejected: {e}")),
            },
            None => ctx.workspace.root.clone(),
        };

        if !search_path.exists() {
            return ToolResult::fail(format!("path not found: {}", search_path.display()));
        }

        let context_lines = args
            .get("context")
            .and_then(Value::as_u64)
            .map_or(0, |v| usize::try_from(v).unwrap_or(0));

        let file_glob = match args.get("glob").and_then(Value::as_str).map(|g| {
            globset::GlobBuilder::new(g).literal_separator(false).build()
        }) {
            Some(Ok(gb)) => Some(gb.compile_matcher()),
            Some(Err(e)) => return ToolResult::fail(format!("invalid file glob: {e}")),
            None => None,
        };

        if search_path.is_file() {
            return search_file(&search_path, &regex, context_lines);
        }

        let mut output = String::new();
        let mut match_count = 0;
        let mut file_count = 0;

        for entry in WalkDir::new(&search_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || e.file_name().to_str().is_none_or(|s| !s.starts_with('.'))
            })
        {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(ref glob) = file_glob {
                let rel = entry.path().strip_prefix(&search_path).unwrap_or(entry.path());
                let file_name = entry.file_name().to_string_lossy();
                if !glob.is_match(rel) && !glob.is_match(file_name.as_ref()) {
                    continue;
                }
            }

            if let Ok(data) = std::fs::read(entry.path()) {
                let check_len = data.len().min(512);
                if data[..check_len].contains(&0) {
                    continue;
                }
            }

            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };

            let lines: Vec<&str> = content.lines().collect();
            let mut file_has_match = false;

            for (idx, line) in lines.iter().enumerate() {
                if regex.is_match(line) {
                    if !file_has_match {
                        file_has_match = true;
                        file_count += 1;
                        if file_count > MAX_MATCHING_FILES {
                            let _ = write!(output, "\n(stopped after {MAX_MATCHING_FILES} files with matches)");
                            return ToolResult::ok(crate::truncate_output(output));
                        }
                    }
                    match_count += 1;
                    write_context_lines(&mut output, entry.path(), &lines, idx, context_lines);
                }
            }
        }

        if match_count == 0 {
            return ToolResult::ok(format!("No matches for \"{pattern_str}\" found"));
        }

        let _ = write!(output, "\n({match_count} matches in {file_count} files)");
        ToolResult::ok(crate::truncate_output(output))
    }
}

fn write_context_lines(output: &mut String, path: &Path, lines: &[&str], idx: usize, context: usize) {
    let line_num = idx + 1;

    let start = idx.saturating_sub(context);
    for (i, line) in lines[start..idx].iter().enumerate() {
        let _ = writeln!(output, "{}:{}-{}", path.display(), start + i + 1, line);
    }

    let _ = writeln!(output, "{}:{line_num}:{}", path.display(), lines[idx]);

    let end = (idx + 1 + context).min(lines.len());
    for (i, line) in lines[(idx + 1)..end].iter().enumerate() {
        let _ = writeln!(output, "{}:{}-{}", path.display(), idx + 2 + i, line);
    }
}

fn search_file(path: &Path, regex: &Regex, context_lines: usize) -> ToolResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return ToolResult::fail(format!("I/O error reading {}: {e}", path.display())),
    };
    let lines: Vec<&str> = content.lines().collect();
    let mut output = String::new();
    let mut match_count = 0;

    for (idx, line) in lines.iter().enumerate() {
        if regex.is_match(line) {
            match_count += 1;
            write_context_lines(&mut output, path, &lines, idx, context_lines);
        }
    }

    if match_count == 0 {
        return ToolResult::ok(format!("No matches found in {}", path.display()));
    }

    let _ = write!(output, "\n({match_count} matches)");
    ToolResult::ok(crate::truncate_output(output))
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
    async fn finds_matching_line() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\nfn test() {}\n").unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn helper() {}\n").unwrap();

        let result = GrepTool
            .execute(serde_json::json!({"pattern": "fn main"}), &ctx(dir.path()))
            .await;

        assert!(result.output.contains("fn main"));
        assert!(result.output.contains("1 matches"));
    }

    #[tokio::test]
    async fn filters_by_glob() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "fn main() {}\n").unwrap();

        let result = GrepTool
            .execute(
                serde_json::json!({"pattern": "fn main", "glob": "*.rs"}),
                &ctx(dir.path()),
            )
            .await;

        assert!(result.output.contains("a.rs"));
        assert!(!result.output.contains("b.txt"));
    }

    #[tokio::test]
    async fn case_insensitive_matches_both_cases() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("test.txt"), "Hello World\nhello world\n").unwrap();

        let result = GrepTool
            .execute(
                serde_json::json!({"pattern": "hello", "case_insensitive": true}),
                &ctx(dir.path()),
            )
            .await;

        assert!(result.output.contains("Hello World"));
        assert!(result.output.contains("hello world"));
    }

    #[tokio::test]
    async fn no_matches_reports_clearly() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("test.txt"), "hello world\n").unwrap();

        let result = GrepTool
            .execute(serde_json::json!({"pattern": "foobar"}), &ctx(dir.path()))
            .await;

        assert!(result.output.contains("No matches"));
    }

    #[tokio::test]
    async fn invalid_regex_is_reported_as_failure() {
        let dir = TempDir::new().unwrap();
        let result = GrepTool
            .execute(serde_json::json!({"pattern": "[invalid"}), &ctx(dir.path()))
            .await;

        assert!(!result.success);
    }
}
