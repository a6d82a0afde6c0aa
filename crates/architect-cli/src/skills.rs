//! Skill file parsing (§6): `SKILL.md` documents with optional YAML
//! frontmatter (`name, description, globs`), installed under
//! `.architect/skills/<name>/SKILL.md` or `.architect/installed-skills/`.
//! Matched skills are folded into a run's extra system context the same
//! way a repo index summary is, per the Agent Loop's own doc comment that
//! this assembly is the caller's job.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Skill {
    pub dir_name: String,
    pub path: PathBuf,
    pub frontmatter: SkillFrontmatter,
    pub body: String,
}

/// Parses `---\n<yaml>\n---\n<body>` frontmatter, if present. A file with
/// no leading `---` is treated as a bodyless-frontmatter skill.
pub fn parse_skill_md(source: &str) -> (SkillFrontmatter, String) {
    let Some(rest) = source.strip_prefix("---\n") else {
        return (SkillFrontmatter::default(), source.to_string());
    };
    let Some(end) = rest.find("\n---") else {
        return (SkillFrontmatter::default(), source.to_string());
    };
    let yaml = &rest[..end];
    let body = rest[end + 4..].trim_start_matches('\n').to_string();
    let frontmatter = serde_yaml::from_str(yaml).unwrap_or_default();
    (frontmatter, body)
}

fn skills_dirs(workspace_root: &Path) -> Vec<PathBuf> {
    vec![workspace_root.join(".architect").join("skills"), workspace_root.join(".architect").join("installed-skills")]
}

/// Loads every `SKILL.md` under both skill directories.
pub fn load_all(workspace_root: &Path) -> Vec<Skill> {
    let mut skills = Vec::new();
    for dir in skills_dirs(workspace_root) {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let skill_md = entry.path().join("SKILL.md");
            let Ok(source) = std::fs::read_to_string(&skill_md) else { continue };
            let (frontmatter, body) = parse_skill_md(&source);
            skills.push(Skill { dir_name: entry.file_name().to_string_lossy().into_owned(), path: skill_md, frontmatter, body });
        }
    }
    skills
}

/// Skills whose `globs` pattern matches at least one changed or mentioned
/// path. A skill with no globs always matches (a general-purpose skill).
#[must_use]
pub fn matching(skills: &[Skill], paths: &[String]) -> Vec<Skill> {
    skills
        .iter()
        .filter(|skill| {
            skill.frontmatter.globs.is_empty()
                || skill.frontmatter.globs.iter().any(|pattern| paths.iter().any(|path| glob_match(pattern, path)))
        })
        .cloned()
        .collect()
}

/// Minimal glob match supporting a single trailing `*` (e.g. `src/**/*.rs`
/// collapsed to suffix matching on `.rs`), enough for the common
/// extension- and prefix-based skill trigger patterns.
fn glob_match(pattern: &str, path: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => path.starts_with(prefix) && path.ends_with(suffix),
        None => path == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frontmatter_and_body() {
        let source = "---\nname: rust-review\ndescription: Review Rust diffs\nglobs:\n  - \"*.rs\"\n---\n\nBody text.\n";
        let (frontmatter, body) = parse_skill_md(source);
        assert_eq!(frontmatter.name.as_deref(), Some("rust-review"));
        assert_eq!(frontmatter.description.as_deref(), Some("Review Rust diffs"));
        assert_eq!(frontmatter.globs, vec!["*.rs".to_string()]);
        assert_eq!(body, "Body text.\n");
    }

    #[test]
    fn missing_frontmatter_keeps_whole_file_as_body() {
        let (frontmatter, body) = parse_skill_md("just a plain skill file\n");
        assert_eq!(frontmatter, SkillFrontmatter::default());
        assert_eq!(body, "just a plain skill file\n");
    }

    #[test]
    fn unterminated_frontmatter_falls_back_to_body() {
        let source = "---\nname: broken\nno closing fence\n";
        let (frontmatter, body) = parse_skill_md(source);
        assert_eq!(frontmatter, SkillFrontmatter::default());
        assert_eq!(body, source);
    }

    #[test]
    fn glob_match_handles_prefix_suffix_and_exact() {
        assert!(glob_match("*.rs", "src/main.rs"));
        assert!(!glob_match("*.rs", "src/main.py"));
        assert!(glob_match("src/*", "src/lib.rs"));
        assert!(glob_match("Cargo.toml", "Cargo.toml"));
        assert!(!glob_match("Cargo.toml", "Cargo.lock"));
    }

    #[test]
    fn skill_with_no_globs_always_matches() {
        let skill = Skill {
            dir_name: "general".to_string(),
            path: PathBuf::from("/tmp/general/SKILL.md"),
            frontmatter: SkillFrontmatter::default(),
            body: String::new(),
        };
        let matched = matching(std::slice::from_ref(&skill), &["anything.txt".to_string()]);
        assert_eq!(matched.len(), 1);
    }
}
