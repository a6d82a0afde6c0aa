//! `{{var}}` substitution over the pipeline's flat variable scope (§4.13).

use std::collections::BTreeMap;

use regex::Regex;

/// Replaces `{{name}}` occurrences in `template` with their string value
/// from `vars`. Undefined variables substitute to the empty string and log
/// a warning, per spec.
pub fn substitute(template: &str, vars: &BTreeMap<String, serde_json::Value>) -> String {
    let re = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("static pattern");
    re.replace_all(template, |caps: &regex::Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value_to_string(value),
            None => {
                tracing::warn!(var = name, "undefined pipeline variable, substituting empty string");
                String::new()
            }
        }
    })
    .into_owned()
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_known_variables() {
        let mut vars = BTreeMap::new();
        vars.insert("target".to_string(), json!("main.rs"));
        assert_eq!(substitute("fix {{target}} please", &vars), "fix main.rs please");
    }

    #[test]
    fn undefined_variables_become_empty() {
        let vars = BTreeMap::new();
        assert_eq!(substitute("fix {{target}} please", &vars), "fix  please");
    }

    #[test]
    fn non_string_values_use_their_json_form() {
        let mut vars = BTreeMap::new();
        vars.insert("count".to_string(), json!(3));
        assert_eq!(substitute("retry {{count}} times", &vars), "retry 3 times");
    }
}
