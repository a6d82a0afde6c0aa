//! Level 1: single tool-result truncation.

use crate::estimate::estimate_text;

/// Truncate `text` to roughly fit under `max_tokens`, preserving the first
/// ~60% and last ~25% (the middle ~15% is dropped along with an explicit
/// marker). Line-granular when `text` has enough lines to make that
/// meaningful; character-granular for short dense text (e.g. a minified
/// single-line blob). `max_tokens == 0` disables truncation entirely.
#[must_use]
pub fn truncate_tool_output(text: &str, max_tokens: usize) -> String {
    if max_tokens == 0 || estimate_text(text) <= max_tokens {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    if lines.len() >= 6 {
        truncate_lines(&lines, max_tokens)
    } else {
        truncate_chars(text, max_tokens)
    }
}

fn truncate_lines(lines: &[&str], max_tokens: usize) -> String {
    let max_chars = max_tokens.saturating_mul(4);
    let head_budget = (max_chars as f64 * 0.60) as usize;
    let tail_budget = (max_chars as f64 * 0.25) as usize;

    let mut head = Vec::new();
    let mut head_chars = 0usize;
    for line in lines {
        if head_chars + line.len() > head_budget && !head.is_empty() {
            break;
        }
        head_chars += line.len();
        head.push(*line);
    }

    let mut tail = Vec::new();
    let mut tail_chars = 0usize;
    for line in lines.iter().rev() {
        if tail_chars + line.len() > tail_budget && !tail.is_empty() {
            break;
        }
        tail_chars += line.len();
        tail.push(*line);
    }
    tail.reverse();

    let omitted = lines.len().saturating_sub(head.len() + tail.len());
    if omitted == 0 {
        return lines.join("\n");
    }

    let mut out = head.join("\n");
    out.push_str(&format!("\n[… {omitted} lines omitted …]\n"));
    out.push_str(&tail.join("\n"));
    out
}

fn truncate_chars(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens.saturating_mul(4);
    let head_len = ((max_chars as f64) * 0.60) as usize;
    let tail_len = ((max_chars as f64) * 0.25) as usize;
    let total = text.len();
    if head_len + tail_len >= total {
        return text.to_string();
    }

    let head = char_boundary_prefix(text, head_len);
    let tail = char_boundary_suffix(text, tail_len);
    let omitted_chars = total.saturating_sub(head.len() + tail.len());
    format!("{head}\n[… {omitted_chars} characters omitted …]\n{tail}")
}

fn char_boundary_prefix(text: &str, target: usize) -> &str {
    let mut idx = target.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    &text[..idx]
}

fn char_boundary_suffix(text: &str, target: usize) -> &str {
    let start = text.len().saturating_sub(target);
    let mut idx = start;
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    &text[idx..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        let text = "short output";
        assert_eq!(truncate_tool_output(text, 1_000), text);
    }

    #[test]
    fn zero_max_tokens_disables_truncation() {
        let text = "x".repeat(10_000);
        assert_eq!(truncate_tool_output(&text, 0), text);
    }

    #[test]
    fn long_multiline_output_is_truncated_with_marker() {
        let lines: Vec<String> = (0..500).map(|i| format!("line {i}")).collect();
        let text = lines.join("\n");
        let truncated = truncate_tool_output(&text, 50);
        assert!(truncated.contains("lines omitted"));
        assert!(truncated.starts_with("line 0"));
        assert!(truncated.ends_with("line 499"));
    }

    #[test]
    fn long_single_line_output_is_character_truncated() {
        let text = "a".repeat(5_000);
        let truncated = truncate_tool_output(&text, 50);
        assert!(truncated.contains("characters omitted"));
        assert!(truncated.len() < text.len());
    }
}
