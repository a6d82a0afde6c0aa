//! The Pipeline Runner driver (§4.13): executes an ordered list of steps,
//! each a fresh Agent Loop turn, threading a flat variable scope through
//! `{{var}}` substitution and `output_var` bindings.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use architect_checkpoint::CheckpointManager;
use architect_llm::LlmProvider;
use architect_ralph::run_check;
use architect_runtime::AgentLoop;
use serde::Serialize;

use crate::condition::evaluate;
use crate::error::{PipelineError, PipelineResult};
use crate::substitute::substitute;
use crate::types::PipelineDef;
use crate::validate::validate;

#[derive(Debug, Clone, Serialize)]
pub struct StepCheckOutcome {
    pub command: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub name: String,
    pub status: StepStatus,
    pub output: String,
    pub cost_usd: f64,
    pub checks: Vec<StepCheckOutcome>,
    pub checkpoint_commit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub steps: Vec<StepOutcome>,
    pub total_cost_usd: f64,
    pub completed: bool,
}

/// Renders the dry-run plan: each step's name and its prompt with
/// `{{var}}` placeholders left visible, skipping no steps.
pub fn plan(def: &PipelineDef, from_step: Option<&str>) -> PipelineResult<String> {
    validate(def)?;
    let start = match from_step {
        Some(name) => def.step_index(name).ok_or_else(|| PipelineError::UnknownStartStep(name.to_string()))?,
        None => 0,
    };

    let mut plan = String::new();
    for step in &def.steps[start..] {
        plan.push_str(&format!("## {}\n", step.name));
        if let Some(condition) = &step.condition {
            plan.push_str(&format!("condition: {condition}\n"));
        }
        plan.push_str(&step.prompt);
        plan.push_str("\n\n");
    }
    Ok(plan)
}

/// Drives one pipeline run. `agent_loops` holds one `AgentLoop` per distinct
/// model a pipeline definition references, pre-constructed by the caller
/// (`architect-cli`) since a single `AgentLoop<P>` is bound to one provider
/// at construction time; `default_model` names the entry used for steps
/// that omit `model`.
pub struct PipelineRunner<P: LlmProvider> {
    agent_loops: HashMap<String, Arc<AgentLoop<P>>>,
    default_model: String,
    workspace_root: PathBuf,
    checkpoint: Option<CheckpointManager>,
    check_timeout: std::time::Duration,
}

impl<P: LlmProvider> PipelineRunner<P> {
    #[must_use]
    pub fn new(
        agent_loops: HashMap<String, Arc<AgentLoop<P>>>,
        default_model: impl Into<String>,
        workspace_root: PathBuf,
        checkpoint: Option<CheckpointManager>,
    ) -> Self {
        Self {
            agent_loops,
            default_model: default_model.into(),
            workspace_root,
            checkpoint,
            check_timeout: std::time::Duration::from_secs(120),
        }
    }

    fn loop_for(&self, model: Option<&str>) -> Option<Arc<AgentLoop<P>>> {
        let key = model.unwrap_or(&self.default_model);
        self.agent_loops.get(key).or_else(|| self.agent_loops.get(&self.default_model)).cloned()
    }

    /// Runs the pipeline to completion or first failure. `initial_vars`
    /// seeds the variable scope; required when `from_step` is set, since
    /// earlier steps' `output_var` bindings are never produced.
    pub async fn run(
        &self,
        def: &PipelineDef,
        initial_vars: BTreeMap<String, serde_json::Value>,
        from_step: Option<&str>,
    ) -> PipelineResult<PipelineOutcome> {
        validate(def)?;
        let start = match from_step {
            Some(name) => def.step_index(name).ok_or_else(|| PipelineError::UnknownStartStep(name.to_string()))?,
            None => 0,
        };

        let mut vars = initial_vars;
        let mut outcomes = Vec::new();
        let mut total_cost = 0.0;

        for step in &def.steps[start..] {
            if let Some(condition) = &step.condition {
                let should_run = evaluate(condition, &vars).unwrap_or_else(|err| {
                    tracing::warn!(step = %step.name, error = %err, "unreadable condition, skipping step");
                    false
                });
                if !should_run {
                    outcomes.push(StepOutcome {
                        name: step.name.clone(),
                        status: StepStatus::Skipped,
                        output: String::new(),
                        cost_usd: 0.0,
                        checks: Vec::new(),
                        checkpoint_commit: None,
                    });
                    continue;
                }
            }

            let prompt = substitute(&step.prompt, &vars);
            let Some(agent_loop) = self.loop_for(step.model.as_deref()) else {
                outcomes.push(StepOutcome {
                    name: step.name.clone(),
                    status: StepStatus::Failed,
                    output: "no agent loop configured for this step's model".to_string(),
                    cost_usd: 0.0,
                    checks: Vec::new(),
                    checkpoint_commit: None,
                });
                return Ok(PipelineOutcome { steps: outcomes, total_cost_usd: total_cost, completed: false });
            };

            let agent_name = step.agent.clone().unwrap_or_else(|| step.name.clone());
            let run_result = agent_loop.run(prompt, agent_name, None).await;

            let (output, cost) = match run_result {
                Ok(outcome) => (outcome.state.final_output.clone().unwrap_or_default(), outcome.session.total_cost),
                Err(err) => {
                    outcomes.push(StepOutcome {
                        name: step.name.clone(),
                        status: StepStatus::Failed,
                        output: err.to_string(),
                        cost_usd: 0.0,
                        checks: Vec::new(),
                        checkpoint_commit: None,
                    });
                    return Ok(PipelineOutcome { steps: outcomes, total_cost_usd: total_cost, completed: false });
                }
            };
            total_cost += cost;

            if let Some(output_var) = &step.output_var {
                vars.insert(output_var.clone(), serde_json::Value::String(output.clone()));
            }

            let mut checks = Vec::with_capacity(step.checks.len());
            for command in &step.checks {
                let result = run_check(command, &self.workspace_root, self.check_timeout).await;
                checks.push(StepCheckOutcome { command: result.command, passed: result.passed });
            }
            let checks_passed = checks.iter().all(|c| c.passed);

            let checkpoint_commit = if checks_passed && step.checkpoint {
                match &self.checkpoint {
                    Some(manager) => {
                        let manager = manager.clone();
                        let step_name = step.name.clone();
                        tokio::task::spawn_blocking(move || {
                            manager.create(&step_name, &format!("pipeline step {step_name}"))
                        })
                        .await
                        .ok()
                        .and_then(Result::ok)
                        .flatten()
                    }
                    None => None,
                }
            } else {
                None
            };

            let status = if checks_passed { StepStatus::Success } else { StepStatus::Failed };
            let failed = status == StepStatus::Failed;
            outcomes.push(StepOutcome {
                name: step.name.clone(),
                status,
                output,
                cost_usd: cost,
                checks,
                checkpoint_commit,
            });

            if failed {
                return Ok(PipelineOutcome { steps: outcomes, total_cost_usd: total_cost, completed: false });
            }
        }

        Ok(PipelineOutcome { steps: outcomes, total_cost_usd: total_cost, completed: true })
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
    fn plan_includes_every_step_prompt() {
        let def = PipelineDef { steps: vec![step("build", "build {{target}}"), step("test", "test it")] };
        let rendered = plan(&def, None).unwrap();
        assert!(rendered.contains("## build"));
        assert!(rendered.contains("build {{target}}"));
        assert!(rendered.contains("## test"));
    }

    #[test]
    fn plan_from_step_skips_earlier_steps() {
        let def = PipelineDef { steps: vec![step("build", "build it"), step("test", "test it")] };
        let rendered = plan(&def, Some("test")).unwrap();
        assert!(!rendered.contains("## build"));
        assert!(rendered.contains("## test"));
    }

    #[test]
    fn plan_rejects_unknown_start_step() {
        let def = PipelineDef { steps: vec![step("build", "build it")] };
        assert!(plan(&def, Some("nonexistent")).is_err());
    }
}
