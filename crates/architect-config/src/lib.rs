//! Configuration file (§6): layered YAML (defaults -> file -> env -> CLI),
//! strict about unknown keys at every nesting level.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod cli;
pub mod env;
pub mod error;
pub mod loader;
pub mod merge;
pub mod types;
pub mod validate;

pub use cli::CliOverrides;
pub use error::{ConfigError, ConfigResult};
pub use loader::{load, ResolvedConfig};
pub use merge::{ConfigLayer, FieldSources};
pub use types::*;
pub use validate::validate as validate_config;
