use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },

    #[error("config validation failed:\n{0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
