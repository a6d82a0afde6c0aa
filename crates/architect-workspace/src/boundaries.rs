//! Workspace boundary checking: confine tool-facing paths to a workspace
//! root, resolving symlinks and `.`/`..` before comparing.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EscapePolicy, WorkspaceConfig};
use crate::error::{WorkspaceError, WorkspaceResult};

/// Result of checking a path against workspace boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCheck {
    /// Path is within the workspace root.
    Allowed,
    /// Path is outside the workspace root but explicitly auto-allowed.
    AutoAllowed,
    /// Path is never allowed (protected system path, or escape policy deny).
    NeverAllowed,
    /// Path is outside the workspace root and requires user approval.
    RequiresApproval,
}

impl PathCheck {
    /// Whether the path may proceed without further prompting.
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed | Self::AutoAllowed)
    }

    /// Whether the path requires confirmation before proceeding.
    #[must_use]
    pub fn needs_approval(self) -> bool {
        matches!(self, Self::RequiresApproval)
    }

    /// Whether the path is blocked outright.
    #[must_use]
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::NeverAllowed)
    }
}

/// Confines paths to a workspace root. Pre-compiles auto-allow glob
/// patterns for efficient repeated matching.
#[derive(Debug)]
pub struct WorkspaceBoundary {
    config: WorkspaceConfig,
    compiled_matchers: Vec<GlobMatcher>,
}

impl Clone for WorkspaceBoundary {
    fn clone(&self) -> Self {
        Self::new(self.config.clone())
    }
}

impl WorkspaceBoundary {
    /// Create a new boundary checker, pre-compiling its glob patterns.
    #[must_use]
    pub fn new(config: WorkspaceConfig) -> Self {
        let compiled_matchers = config
            .auto_allow
            .patterns
            .iter()
            .filter_map(|pattern| match Glob::new(pattern) {
                Ok(glob) => Some(glob.compile_matcher()),
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "failed to compile auto-allow glob");
                    None
                }
            })
            .collect();

        Self {
            config,
            compiled_matchers,
        }
    }

    /// The underlying configuration.
    #[must_use]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Resolve a path to its canonical, absolute form. Falls back to
    /// lexical normalization against the workspace root when the path
    /// does not exist yet (e.g. a file about to be created) — `..` and `.`
    /// components are always resolved lexically first, so a traversal
    /// attempt against a not-yet-existing path can't slip past a naive
    /// `starts_with` check.
    #[must_use]
    pub fn expand_path(&self, path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            let joined = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.config.root.join(path)
            };
            normalize_lexically(&joined)
        })
    }

    /// Whether the resolved path is within the workspace root.
    #[must_use]
    pub fn is_in_workspace(&self, path: &Path) -> bool {
        let expanded = self.expand_path(path);
        let root = self.config.root.canonicalize().unwrap_or_else(|_| self.config.root.clone());
        expanded.starts_with(&root)
    }

    /// Whether the resolved path matches an explicit auto-allow rule.
    #[must_use]
    pub fn is_auto_allowed(&self, path: &Path) -> bool {
        let expanded = self.expand_path(path);

        for allowed in &self.config.auto_allow.read {
            if expanded.starts_with(allowed) {
                return true;
            }
        }
        for allowed in &self.config.auto_allow.write {
            if expanded.starts_with(allowed) {
                return true;
            }
        }
        self.compiled_matchers.iter().any(|m| m.is_match(&expanded))
    }

    /// Whether the resolved path matches a never-allow rule.
    #[must_use]
    pub fn is_never_allowed(&self, path: &Path) -> bool {
        let expanded = self.expand_path(path);

        for blocked in &self.config.never_allow {
            let blocked_expanded = blocked.canonicalize().unwrap_or_else(|_| blocked.clone());
            if expanded.starts_with(&blocked_expanded) || expanded.starts_with(blocked) {
                return true;
            }
        }
        false
    }

    /// Check one path against the full boundary policy.
    #[must_use]
    pub fn check(&self, path: &Path) -> PathCheck {
        let expanded = self.expand_path(path);

        debug!(path = %path.display(), expanded = %expanded.display(), "checking path against workspace");

        if self.is_never_allowed(&expanded) {
            return PathCheck::NeverAllowed;
        }
        if self.is_in_workspace(&expanded) {
            return PathCheck::Allowed;
        }
        if self.is_auto_allowed(&expanded) {
            return PathCheck::AutoAllowed;
        }

        match self.config.escape_policy {
            EscapePolicy::Allow => PathCheck::AutoAllowed,
            EscapePolicy::Deny => PathCheck::NeverAllowed,
            EscapePolicy::Ask => PathCheck::RequiresApproval,
        }
    }

    /// Check multiple paths and return the most restrictive result.
    #[must_use]
    pub fn check_all(&self, paths: &[&Path]) -> PathCheck {
        let mut result = PathCheck::Allowed;

        for path in paths {
            match self.check(path) {
                PathCheck::NeverAllowed => return PathCheck::NeverAllowed,
                PathCheck::RequiresApproval => result = PathCheck::RequiresApproval,
                PathCheck::AutoAllowed if result == PathCheck::Allowed => {
                    result = PathCheck::AutoAllowed;
                }
                _ => {}
            }
        }

        result
    }
}

/// Resolve `..`/`.` components without touching the filesystem. Used as the
/// fallback path for inputs that don't exist yet, where `canonicalize`
/// can't help — `PathBuf::join` alone would leave literal `..` components in
/// place, which defeats a `starts_with`-based boundary check.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

/// Resolve `input` against `config`'s workspace root, rejecting traversal.
///
/// The absolute path must be inside the resolved workspace root after
/// symlink resolution. Comparison is by prefix on fully resolved path
/// components, never by string containment.
pub fn validate_path(input: &Path, config: &WorkspaceConfig) -> WorkspaceResult<PathBuf> {
    let boundary = WorkspaceBoundary::new(config.clone());
    let resolved = boundary.expand_path(input);
    let root = config.root.canonicalize().unwrap_or_else(|_| config.root.clone());

    if resolved.starts_with(&root) {
        Ok(resolved)
    } else if boundary.is_auto_allowed(&resolved) {
        Ok(resolved)
    } else {
        Err(WorkspaceError::PathTraversal {
            path: input.to_path_buf(),
            root,
        })
    }
}

/// Additionally require `config.allow_delete` before permitting a deletion
/// against `path`. Call after [`validate_path`] has already confirmed the
/// path is in-bounds.
pub fn validate_delete(path: &Path, config: &WorkspaceConfig) -> WorkspaceResult<()> {
    if config.allow_delete {
        Ok(())
    } else {
        Err(WorkspaceError::DeleteNotAllowed {
            path: path.to_path_buf(),
        })
    }
}
