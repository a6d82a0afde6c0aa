//! Pipeline validation (§4.13): runs before any execution and collects
//! every violation at once rather than failing on the first one found.

use std::fmt;

use crate::types::PipelineDef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineValidationError {
    pub violations: Vec<String>,
}

impl fmt::Display for PipelineValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "- {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineValidationError {}

pub fn validate(def: &PipelineDef) -> Result<(), PipelineValidationError> {
    let mut violations = Vec::new();

    if def.steps.is_empty() {
        violations.push("pipeline must define at least one step".to_string());
    }

    let mut seen_names = std::collections::HashSet::new();
    for (index, step) in def.steps.iter().enumerate() {
        if step.name.trim().is_empty() {
            violations.push(format!("step {index}: name must not be empty"));
        } else if !seen_names.insert(step.name.as_str()) {
            violations.push(format!("step {index} ({}): duplicate step name", step.name));
        }
        if step.prompt.trim().is_empty() {
            violations.push(format!("step {index} ({}): prompt must not be empty", step.name));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PipelineValidationError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PipelineStep;

    fn step(name: &str, prompt: &str) -> PipelineStep {
        PipelineStep {
            name: name.to_string(),
            agent: None,
            prompt: prompt.to_string(),
            model: None,
            condition: None,
            output_var: None,
            checks: Vec::new(),
            checkpoint: false,
            timeout: None,
        }
    }

    #[test]
    fn empty_step_list_is_a_violation() {
        let err = validate(&PipelineDef { steps: vec![] }).unwrap_err();
        assert_eq!(err.violations.len(), 1);
    }

    #[test]
    fn collects_all_violations_at_once() {
        let def = PipelineDef { steps: vec![step("build", ""), step("build", "")] };
        let err = validate(&def).unwrap_err();
        assert_eq!(err.violations.len(), 3);
    }

    #[test]
    fn a_well_formed_pipeline_passes() {
        let def = PipelineDef { steps: vec![step("build", "build it"), step("test", "test it")] };
        assert!(validate(&def).is_ok());
    }
}
