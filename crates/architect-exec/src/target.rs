//! Generic argument inspection shared by the guardrail pre-checks: a tool
//! call's arguments are a free-form JSON object, so path and content
//! extraction is done by well-known key name rather than per-tool-name
//! branching (new built-in tools need no changes here as long as they use
//! these conventional field names).

use serde_json::Value;

/// Argument keys that commonly hold a filesystem path.
const PATH_KEYS: &[&str] = &["file_path", "path", "directory"];

/// Argument keys that commonly hold the content a write-like tool is about
/// to commit to disk.
const CONTENT_KEYS: &[&str] = &["content", "new_string"];

/// Extract the path argument from a tool call, if any.
#[must_use]
pub fn extract_path(args: &Value) -> Option<&str> {
    let obj = args.as_object()?;
    PATH_KEYS.iter().find_map(|key| obj.get(*key)).and_then(Value::as_str)
}

/// Extract the proposed write content from a tool call, if any. For
/// `edit_file` this is `new_string`, the text about to be committed — not
/// a full-file diff, but enough for a regex-based code rule to catch.
#[must_use]
pub fn extract_proposed_content(args: &Value) -> Option<&str> {
    let obj = args.as_object()?;
    CONTENT_KEYS.iter().find_map(|key| obj.get(*key)).and_then(Value::as_str)
}

/// Rough count of lines the proposed content would add, for the
/// guardrails edit-limit accounting.
#[must_use]
pub fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        0
    } else {
        content.lines().count().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_file_path_key() {
        let args = serde_json::json!({"file_path": "a.txt", "content": "hi"});
        assert_eq!(extract_path(&args), Some("a.txt"));
        assert_eq!(extract_proposed_content(&args), Some("hi"));
    }

    #[test]
    fn missing_keys_return_none() {
        let args = serde_json::json!({"pattern": "foo"});
        assert_eq!(extract_path(&args), None);
        assert_eq!(extract_proposed_content(&args), None);
    }

    #[test]
    fn line_count_treats_nonempty_single_line_as_one() {
        assert_eq!(count_lines("hello"), 1);
        assert_eq!(count_lines("a\nb\nc"), 3);
        assert_eq!(count_lines(""), 0);
    }
}
