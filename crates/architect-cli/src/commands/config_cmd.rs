//! `architect validate-config` (§6): schema check.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use architect_config::CliOverrides;
use colored::Colorize;

use crate::exit_code;

pub fn handle_validate(config_path: &Path, env: &HashMap<String, String>) -> Result<i32> {
    if !config_path.exists() {
        eprintln!("{}", format!("no config file at {}, nothing to validate", config_path.display()).yellow());
        return Ok(exit_code::SUCCESS);
    }

    match architect_config::load(Some(config_path), env, &CliOverrides::default()) {
        Ok(resolved) => {
            println!("{}", "config is valid".green());
            for (section, layer) in resolved.field_sources.iter() {
                println!("  {section}: {layer:?}");
            }
            Ok(exit_code::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", format!("config is invalid: {e}").red());
            Ok(exit_code::CONFIG_ERROR)
        }
    }
}
