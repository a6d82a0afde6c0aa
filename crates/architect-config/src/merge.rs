//! Section-level provenance tracking: this crate has one file layer, so
//! recording which top-level section a value came from (defaults, file,
//! env, or CLI) is enough granularity to be useful in `architect
//! validate-config`.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLayer {
    Defaults,
    File,
    Env,
    Cli,
}

pub type FieldSources = BTreeMap<String, ConfigLayer>;

pub const SECTION_NAMES: &[&str] = &[
    "llm", "agents", "workspace", "logging", "indexer", "context", "costs", "llm_cache", "commands", "hooks",
    "guardrails", "skills", "memory", "mcp", "evaluation", "telemetry", "health", "presets",
];

/// Marks every top-level section present in `raw` as sourced from the file
/// layer; sections absent from `raw` keep whatever they were marked as
/// before this call (defaults, by convention).
pub fn mark_sections_present(raw: &serde_yaml::Value, sources: &mut FieldSources) {
    let Some(mapping) = raw.as_mapping() else { return };
    for key in mapping.keys() {
        if let Some(name) = key.as_str() {
            if SECTION_NAMES.contains(&name) {
                sources.insert(name.to_string(), ConfigLayer::File);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_only_sections_present_in_the_document() {
        let raw: serde_yaml::Value = serde_yaml::from_str("llm:\n  model: x\n").unwrap();
        let mut sources = FieldSources::new();
        mark_sections_present(&raw, &mut sources);
        assert_eq!(sources.get("llm"), Some(&ConfigLayer::File));
        assert!(sources.get("agents").is_none());
    }
}
