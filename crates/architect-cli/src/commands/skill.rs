//! `architect skill {install, create, list, remove}` (§6).

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use crate::exit_code;
use crate::skills;

#[derive(Subcommand)]
pub enum SkillCommands {
    /// Copy a skill directory (containing a `SKILL.md`) into the workspace.
    Install {
        /// Path to a skill directory to copy in.
        source: std::path::PathBuf,
    },
    /// Scaffold a new skill under `.architect/skills/<name>/SKILL.md`.
    Create {
        /// Skill name (becomes the directory name).
        name: String,
        /// One-line description, stored in the frontmatter.
        #[arg(long)]
        description: Option<String>,
        /// Glob pattern(s) this skill applies to; repeatable.
        #[arg(long = "glob")]
        globs: Vec<String>,
    },
    /// List installed skills.
    List,
    /// Remove an installed skill by directory name.
    Remove {
        /// Skill directory name.
        name: String,
    },
}

pub fn handle(command: SkillCommands, workspace_root: &Path) -> Result<i32> {
    match command {
        SkillCommands::Install { source } => install(&source, workspace_root),
        SkillCommands::Create { name, description, globs } => create(&name, description, globs, workspace_root),
        SkillCommands::List => list(workspace_root),
        SkillCommands::Remove { name } => remove(&name, workspace_root),
    }
}

fn installed_dir(workspace_root: &Path) -> std::path::PathBuf {
    workspace_root.join(".architect").join("installed-skills")
}

fn skills_dir(workspace_root: &Path) -> std::path::PathBuf {
    workspace_root.join(".architect").join("skills")
}

fn install(source: &Path, workspace_root: &Path) -> Result<i32> {
    let skill_md = source.join("SKILL.md");
    anyhow::ensure!(skill_md.exists(), "{} has no SKILL.md", source.display());

    let name = source.file_name().context("skill source has no directory name")?;
    let dest = installed_dir(workspace_root).join(name);
    std::fs::create_dir_all(&dest)?;
    copy_dir(source, &dest)?;

    println!("{}", format!("installed skill into {}", dest.display()).green());
    Ok(exit_code::SUCCESS)
}

fn copy_dir(source: &Path, dest: &Path) -> Result<()> {
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&target)?;
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

fn create(name: &str, description: Option<String>, globs: Vec<String>, workspace_root: &Path) -> Result<i32> {
    let dir = skills_dir(workspace_root).join(name);
    anyhow::ensure!(!dir.exists(), "skill {name} already exists at {}", dir.display());
    std::fs::create_dir_all(&dir)?;

    let globs_yaml = if globs.is_empty() {
        "[]".to_string()
    } else {
        format!("[{}]", globs.iter().map(|g| format!("{g:?}")).collect::<Vec<_>>().join(", "))
    };
    let content = format!(
        "---\nname: {name}\ndescription: {}\nglobs: {globs_yaml}\n---\n\n# {name}\n\nDescribe when and how this skill applies.\n",
        description.unwrap_or_default()
    );
    std::fs::write(dir.join("SKILL.md"), content)?;

    println!("{}", format!("created skill {name} at {}", dir.display()).green());
    Ok(exit_code::SUCCESS)
}

fn list(workspace_root: &Path) -> Result<i32> {
    let found = skills::load_all(workspace_root);
    if found.is_empty() {
        eprintln!("{}", "no skills installed".dimmed());
        return Ok(exit_code::SUCCESS);
    }
    for skill in found {
        let description = skill.frontmatter.description.unwrap_or_default();
        println!("{}  {}", skill.dir_name, description);
    }
    Ok(exit_code::SUCCESS)
}

fn remove(name: &str, workspace_root: &Path) -> Result<i32> {
    let mut removed = false;
    for dir in [skills_dir(workspace_root).join(name), installed_dir(workspace_root).join(name)] {
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
            removed = true;
        }
    }
    anyhow::ensure!(removed, "no skill named {name} found");
    println!("{}", format!("removed skill {name}").green());
    Ok(exit_code::SUCCESS)
}
