pub mod agents;
pub mod checkpoint;
pub mod config_cmd;
pub mod eval;
pub mod init;
pub mod loop_cmd;
pub mod parallel;
pub mod pipeline;
pub mod run;
pub mod sessions;
pub mod skill;

use std::collections::HashMap;
use std::path::Path;

use architect_config::{CliOverrides, Config};

use crate::error::{CliError, CliResult};

/// Loads and validates the config layered at `config_path`, with shared
/// CLI overrides. Every command that needs the resolved [`Config`] calls
/// this instead of `architect_config::loader::load` directly so config
/// errors always map to exit code 3.
pub(crate) fn load_config(
    config_path: &Path,
    env: &HashMap<String, String>,
    cli_overrides: &CliOverrides,
) -> CliResult<Config> {
    let path = config_path.exists().then_some(config_path);
    architect_config::load(path, env, cli_overrides).map(|resolved| resolved.config).map_err(|e| CliError::Config(e.to_string()))
}
