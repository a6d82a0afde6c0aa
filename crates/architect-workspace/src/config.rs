//! Workspace configuration: the root an agent run is confined to, plus
//! any explicitly configured exceptions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a path outside the workspace root, and not covered by an explicit
/// auto-allow or never-allow rule, should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscapePolicy {
    /// Allow paths outside the workspace root.
    Allow,
    /// Deny paths outside the workspace root.
    Deny,
    /// Ask the Confirmation Policy before allowing.
    #[default]
    Ask,
}

/// Paths auto-allowed outside the workspace root without a prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoAllow {
    /// Prefixes allowed for read-like tools.
    #[serde(default)]
    pub read: Vec<PathBuf>,
    /// Prefixes allowed for write-like tools.
    #[serde(default)]
    pub write: Vec<PathBuf>,
    /// Glob patterns matched against the resolved path, allowed for any tool.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Configuration for one workspace. Every tool and guardrail check takes
/// this explicitly rather than reading an ambient global, so parallel
/// runners can construct one instance per worktree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Workspace root. All paths are confined here unless explicitly
    /// auto-allowed.
    pub root: PathBuf,
    /// Paths that are never allowed regardless of mode (e.g. `/etc`).
    #[serde(default)]
    pub never_allow: Vec<PathBuf>,
    /// Explicit exceptions to the workspace boundary.
    #[serde(default)]
    pub auto_allow: AutoAllow,
    /// What to do with paths outside the workspace root that aren't
    /// otherwise covered.
    #[serde(default)]
    pub escape_policy: EscapePolicy,
    /// Whether deletion tools are permitted at all in this workspace.
    #[serde(default)]
    pub allow_delete: bool,
}

impl WorkspaceConfig {
    /// Construct a config confined to `root` with no exceptions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            never_allow: Vec::new(),
            auto_allow: AutoAllow::default(),
            escape_policy: EscapePolicy::default(),
            allow_delete: false,
        }
    }

    /// Add a never-allow path.
    #[must_use]
    pub fn never_allow(mut self, path: impl Into<PathBuf>) -> Self {
        self.never_allow.push(path.into());
        self
    }

    /// Add a read-auto-allow path.
    #[must_use]
    pub fn allow_read(mut self, path: impl Into<PathBuf>) -> Self {
        self.auto_allow.read.push(path.into());
        self
    }

    /// Add a write-auto-allow path.
    #[must_use]
    pub fn allow_write(mut self, path: impl Into<PathBuf>) -> Self {
        self.auto_allow.write.push(path.into());
        self
    }

    /// Set the escape policy.
    #[must_use]
    pub fn with_escape_policy(mut self, policy: EscapePolicy) -> Self {
        self.escape_policy = policy;
        self
    }

    /// Permit deletion tools in this workspace.
    #[must_use]
    pub fn with_allow_delete(mut self, allow: bool) -> Self {
        self.allow_delete = allow;
        self
    }

    /// The workspace root as a `Path`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
