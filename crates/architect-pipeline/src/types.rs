//! Pipeline definition shapes (§4.13), parsed directly from YAML.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineStep {
    pub name: String,
    pub agent: Option<String>,
    pub prompt: String,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub output_var: Option<String>,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub checkpoint: bool,
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDef {
    pub steps: Vec<PipelineStep>,
}

impl PipelineDef {
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    #[must_use]
    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name == name)
    }
}
