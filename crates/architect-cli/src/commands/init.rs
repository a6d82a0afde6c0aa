//! `architect init` (§6): scaffold the `.architect/` state layout for a
//! new workspace.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::exit_code;

#[derive(Args)]
pub struct InitArgs {
    /// Named preset to seed the config file from (minimal, default, strict).
    #[arg(default_value = "default")]
    pub preset: String,
}

pub fn handle(args: InitArgs, workspace_root: &Path) -> Result<i32> {
    let dot_architect = workspace_root.join(".architect");
    if dot_architect.exists() {
        println!("{}", format!("workspace already initialized at {}", dot_architect.display()).yellow());
        return Ok(exit_code::SUCCESS);
    }

    for sub in ["sessions", "skills", "installed-skills", "index_cache", "cache"] {
        std::fs::create_dir_all(dot_architect.join(sub))?;
    }
    std::fs::write(dot_architect.join("memory.md"), "")?;
    std::fs::write(dot_architect.join("progress.md"), "")?;

    let config_path = dot_architect.join("config.yaml");
    std::fs::write(&config_path, preset_config(&args.preset))?;

    println!("{}", "initialized workspace".green());
    println!("  created: {}", dot_architect.display());
    println!("  config:  {}", config_path.display());
    Ok(exit_code::SUCCESS)
}

fn preset_config(preset: &str) -> String {
    let confirm_mode = match preset {
        "minimal" => "yolo",
        "strict" => "confirm-all",
        _ => "confirm-sensitive",
    };
    format!(
        "# Architect workspace configuration ({preset} preset)\n\
         # See the README for the full schema.\n\
         \n\
         llm:\n\
         \x20 model: claude-sonnet-4-5\n\
         \x20 api_key_env: LITELLM_API_KEY\n\
         \n\
         agents:\n\
         \x20 default_confirm_mode: {confirm_mode}\n\
         \n\
         workspace:\n\
         \x20 escape_policy: deny\n"
    )
}
