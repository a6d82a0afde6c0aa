use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline definition is invalid:\n{0}")]
    Validation(#[from] crate::validate::PipelineValidationError),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown start step {0:?}")]
    UnknownStartStep(String),

    #[error("agent loop error: {0}")]
    Runtime(#[from] architect_runtime::RuntimeError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] architect_checkpoint::CheckpointError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
