//! Minimal boolean condition evaluator for step `condition` fields (§4.13).
//!
//! No expression-evaluator crate appears anywhere in the corpus, so this is
//! hand-rolled and deliberately scoped rather than a general expression
//! language: `true`/`false` literals, bare variable truthiness, `!var`
//! negation, `var == "literal"` / `var != "literal"` comparisons, and a
//! single level of `&&`/`||` combination (no mixed precedence, no
//! parentheses). Anything past that scope is rejected rather than guessed
//! at.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("unsupported condition syntax: {0:?}")]
    Unsupported(String),
}

/// Evaluates `expr` against the current variable scope.
pub fn evaluate(expr: &str, vars: &BTreeMap<String, serde_json::Value>) -> Result<bool, ConditionError> {
    let expr = expr.trim();
    if let Some((left, right)) = split_once_outside_quotes(expr, "&&") {
        return Ok(evaluate(left, vars)? && evaluate(right, vars)?);
    }
    if let Some((left, right)) = split_once_outside_quotes(expr, "||") {
        return Ok(evaluate(left, vars)? || evaluate(right, vars)?);
    }
    evaluate_atom(expr, vars)
}

fn evaluate_atom(expr: &str, vars: &BTreeMap<String, serde_json::Value>) -> Result<bool, ConditionError> {
    let expr = expr.trim();

    match expr {
        "true" => return Ok(true),
        "false" => return Ok(false),
        _ => {}
    }

    if let Some(rest) = expr.strip_prefix('!') {
        return Ok(!truthy(rest.trim(), vars));
    }

    if let Some((name, literal)) = split_once_outside_quotes(expr, "==") {
        return Ok(lookup_string(name.trim(), vars) == unquote(literal.trim()));
    }
    if let Some((name, literal)) = split_once_outside_quotes(expr, "!=") {
        return Ok(lookup_string(name.trim(), vars) != unquote(literal.trim()));
    }

    if is_identifier(expr) {
        return Ok(truthy(expr, vars));
    }

    Err(ConditionError::Unsupported(expr.to_string()))
}

fn truthy(name: &str, vars: &BTreeMap<String, serde_json::Value>) -> bool {
    match vars.get(name) {
        None => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(serde_json::Value::Array(a)) => !a.is_empty(),
        Some(serde_json::Value::Object(o)) => !o.is_empty(),
    }
}

fn lookup_string(name: &str, vars: &BTreeMap<String, serde_json::Value>) -> String {
    match vars.get(name) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits on the first occurrence of `sep` that falls outside a quoted
/// literal, so `name == "a && b"` is not mistaken for a combinator.
fn split_once_outside_quotes<'a>(s: &'a str, sep: &str) -> Option<(&'a str, &'a str)> {
    let mut in_quotes = false;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i + sep.len() <= bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            _ if !in_quotes && &s[i..i + sep.len()] == sep => {
                return Some((&s[..i], &s[i + sep.len()..]));
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars() -> BTreeMap<String, serde_json::Value> {
        let mut v = BTreeMap::new();
        v.insert("build_ok".to_string(), json!(true));
        v.insert("status".to_string(), json!("passed"));
        v.insert("empty".to_string(), json!(""));
        v
    }

    #[test]
    fn literals_and_bare_truthiness() {
        assert!(evaluate("true", &vars()).unwrap());
        assert!(!evaluate("false", &vars()).unwrap());
        assert!(evaluate("build_ok", &vars()).unwrap());
        assert!(!evaluate("empty", &vars()).unwrap());
        assert!(!evaluate("missing", &vars()).unwrap());
    }

    #[test]
    fn negation() {
        assert!(!evaluate("!build_ok", &vars()).unwrap());
        assert!(evaluate("!missing", &vars()).unwrap());
    }

    #[test]
    fn string_equality() {
        assert!(evaluate("status == \"passed\"", &vars()).unwrap());
        assert!(evaluate("status != \"failed\"", &vars()).unwrap());
    }

    #[test]
    fn combinators() {
        assert!(evaluate("build_ok && status == \"passed\"", &vars()).unwrap());
        assert!(evaluate("!build_ok || status == \"passed\"", &vars()).unwrap());
        assert!(!evaluate("!build_ok && status == \"passed\"", &vars()).unwrap());
    }

    #[test]
    fn unsupported_syntax_is_rejected() {
        assert!(evaluate("(a || b)", &vars()).is_err());
    }
}
