//! The reviewer's output shape and verdict parsing (§4.16).

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResult {
    pub has_issues: bool,
    pub review_text: String,
    pub cost: f64,
}

/// Parses a leading `ISSUES: yes|no` line off the reviewer's output,
/// returning the verdict and the remaining text with that line and the
/// blank line after it stripped. Output that doesn't start with a
/// recognizable verdict line is treated as `has_issues = true` (fail
/// closed) and returned unmodified, with a warning logged.
#[must_use]
pub fn parse_verdict(output: &str) -> (bool, String) {
    let re = Regex::new(r"(?i)^\s*ISSUES:\s*(yes|no)\s*\n\n?").expect("static pattern");
    if let Some(caps) = re.captures(output) {
        let has_issues = caps[1].eq_ignore_ascii_case("yes");
        let rest = output[caps.get(0).unwrap().end()..].to_string();
        (has_issues, rest)
    } else {
        tracing::warn!("reviewer output had no recognizable verdict line, defaulting to has_issues=true");
        (true, output.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_verdict() {
        let (has_issues, text) = parse_verdict("ISSUES: no\n\nLooks good.");
        assert!(!has_issues);
        assert_eq!(text, "Looks good.");
    }

    #[test]
    fn parses_an_issues_verdict_case_insensitively() {
        let (has_issues, text) = parse_verdict("issues: YES\n\nMissing a null check.");
        assert!(has_issues);
        assert_eq!(text, "Missing a null check.");
    }

    #[test]
    fn missing_verdict_defaults_to_has_issues() {
        let (has_issues, text) = parse_verdict("This change looks fine to me.");
        assert!(has_issues);
        assert_eq!(text, "This change looks fine to me.");
    }
}
