//! Builds a [`RepoIndex`]: a tree walk plus per-file language/line stats,
//! summarized into a short string the Agent Loop can fold into its system
//! prompt.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{IndexError, IndexResult};
use crate::language::classify;

/// Directory names skipped outright: build output and VCS metadata add
/// nothing to a context summary and can dwarf the real source tree.
const SKIP_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    "dist",
    "build",
    ".venv",
    "__pycache__",
];

/// Files over this size are counted but not line-scanned (likely binary
/// or generated; scanning them wastes time and produces meaningless
/// line counts).
const MAX_SCAN_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileStats {
    pub size: u64,
    pub language: String,
    pub lines: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoIndex {
    pub files: BTreeMap<PathBuf, FileStats>,
    pub tree_summary: String,
    pub total_files: usize,
    pub total_lines: usize,
    pub languages: BTreeMap<String, usize>,
    pub built_at: DateTime<Utc>,
}

impl RepoIndex {
    /// Walk `root` and build a fresh index. Hidden directories and
    /// [`SKIP_DIRS`] are excluded; files above [`MAX_SCAN_BYTES`] are
    /// counted in `total_files`/`languages` but not line-scanned.
    pub fn build(root: &Path) -> IndexResult<Self> {
        if !root.exists() {
            return Err(IndexError::RootNotFound(root.to_path_buf()));
        }

        let mut files = BTreeMap::new();
        let mut languages: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_lines = 0usize;

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !name.starts_with('.') && !SKIP_DIRS.contains(&name.as_ref())
            })
        {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let size = metadata.len();
            let language = classify(path).to_string();

            let lines = if size <= MAX_SCAN_BYTES {
                std::fs::read_to_string(path)
                    .map(|content| content.lines().count())
                    .unwrap_or(0)
            } else {
                0
            };

            total_lines += lines;
            *languages.entry(language.clone()).or_insert(0) += 1;

            let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            files.insert(rel, FileStats { size, language, lines });
        }

        let total_files = files.len();
        let tree_summary = summarize_tree(&files, &languages, total_files, total_lines);

        Ok(Self {
            files,
            tree_summary,
            total_files,
            total_lines,
            languages,
            built_at: Utc::now(),
        })
    }
}

/// Renders a compact human-readable summary: top-level directory counts
/// plus a language/line breakdown, suitable for a system prompt.
fn summarize_tree(
    files: &BTreeMap<PathBuf, FileStats>,
    languages: &BTreeMap<String, usize>,
    total_files: usize,
    total_lines: usize,
) -> String {
    let mut top_level: BTreeMap<String, usize> = BTreeMap::new();
    for path in files.keys() {
        let first = path
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_else(|| "(root)".to_string());
        *top_level.entry(first).or_insert(0) += 1;
    }

    let mut out = format!("{total_files} files, {total_lines} lines\n");
    out.push_str("Top-level:\n");
    for (dir, count) in &top_level {
        out.push_str(&format!("  {dir}/ ({count} files)\n"));
    }
    out.push_str("Languages:\n");
    let mut by_count: Vec<_> = languages.iter().filter(|(l, _)| l.as_str() != "other").collect();
    by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (lang, count) in by_count.into_iter().take(10) {
        out.push_str(&format!("  {lang}: {count} files\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_index_over_a_small_tree() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("src")).unwrap();
        std::fs::write(tmp.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        std::fs::write(tmp.path().join("README.md"), "# hi\n\nworld\n").unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        std::fs::write(tmp.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();

        let index = RepoIndex::build(tmp.path()).unwrap();
        assert_eq!(index.total_files, 2);
        assert!(index.files.contains_key(Path::new("src/main.rs")));
        assert!(!index.files.keys().any(|p| p.starts_with(".git")));
        assert_eq!(index.languages.get("Rust"), Some(&1));
        assert!(index.tree_summary.contains("2 files"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = RepoIndex::build(Path::new("/no/such/path/at/all"));
        assert!(matches!(result, Err(IndexError::RootNotFound(_))));
    }

    #[test]
    fn skips_configured_build_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("target/debug")).unwrap();
        std::fs::write(tmp.path().join("target/debug/out.bin"), [0u8, 1, 2]).unwrap();
        std::fs::write(tmp.path().join("lib.rs"), "pub fn f() {}\n").unwrap();

        let index = RepoIndex::build(tmp.path()).unwrap();
        assert_eq!(index.total_files, 1);
    }
}
