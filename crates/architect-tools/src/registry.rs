//! Tool Registry: name→tool mapping, schema export, name-filtered views.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use architect_core::{ToolDescriptor, ToolResult};
use architect_workspace::WorkspaceConfig;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::error::ToolError;

/// Errors raised by registry operations themselves (not tool execution).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `register` was called with a name that already exists.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),
    /// `get` was called with a name that doesn't exist.
    #[error("tool not found: {0}")]
    NotFound(String),
}

/// A built-in tool: executes directly in-process (as opposed to a remote
/// MCP tool, discovered separately and addressed as `server:tool`).
#[async_trait::async_trait]
pub trait BuiltinTool: Send + Sync {
    /// Tool name. No colon — distinguishes from the `server:tool` remote
    /// naming convention.
    fn name(&self) -> &'static str;

    /// Human/LLM-facing description.
    fn description(&self) -> &'static str;

    /// JSON Schema for this tool's arguments.
    fn input_schema(&self) -> Value;

    /// Whether this tool is classified sensitive — triggers confirmation in
    /// `confirm-sensitive` mode.
    fn sensitive(&self) -> bool {
        false
    }

    /// Structurally validate raw arguments, rejecting unknown fields.
    /// Default implementation accepts anything; tools with a stricter
    /// shape override this.
    fn validate_args(&self, raw: Value) -> Result<Value, ToolError> {
        Ok(raw)
    }

    /// Execute with validated arguments. Never raises — failures are
    /// reported through the returned [`ToolResult`].
    async fn execute(&self, args: Value, ctx: &ToolContext) -> ToolResult;

    /// The LLM-facing tool descriptor.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            argument_schema: self.input_schema(),
            sensitive: self.sensitive(),
        }
    }
}

/// Shared, per-run context available to every built-in tool.
pub struct ToolContext {
    /// Workspace this run is confined to.
    pub workspace: WorkspaceConfig,
    /// Current working directory, persisted across `run_command` calls
    /// within one run (a `cd` in one call affects the next).
    pub cwd: Arc<RwLock<PathBuf>>,
    /// When true, write-like tools must record a planned action instead of
    /// executing (Execution Engine step 6).
    pub dry_run: bool,
}

impl ToolContext {
    /// Create a new tool context rooted at `workspace`'s root.
    #[must_use]
    pub fn new(workspace: WorkspaceConfig) -> Self {
        let cwd = Arc::new(RwLock::new(workspace.root.clone()));
        Self {
            workspace,
            cwd,
            dry_run: false,
        }
    }

    /// Create a context flagged for dry-run recording.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Registry of built-in tools for lookup and LLM schema export.
/// Insertion order is preserved for deterministic `list_names` /
/// `get_schemas` output.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn BuiltinTool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a registry with every built-in tool registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::ReadFileTool)).expect("unique name");
        registry.register(Box::new(crate::WriteFileTool)).expect("unique name");
        registry.register(Box::new(crate::EditFileTool)).expect("unique name");
        registry.register(Box::new(crate::GlobTool)).expect("unique name");
        registry.register(Box::new(crate::GrepTool)).expect("unique name");
        registry.register(Box::new(crate::ListDirectoryTool)).expect("unique name");
        registry.register(Box::new(crate::RunCommandTool::new())).expect("unique name");
        registry
    }

    /// Register a tool. Fails with [`RegistryError::DuplicateTool`] if the
    /// name already exists.
    pub fn register(&mut self, tool: Box<dyn BuiltinTool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name. Fails with [`RegistryError::NotFound`].
    pub fn get(&self, name: &str) -> Result<&dyn BuiltinTool, RegistryError> {
        self.tools
            .get(name)
            .map(AsRef::as_ref)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Whether a name refers to a built-in (as opposed to a remote,
    /// `server:tool`-addressed) tool.
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        !name.contains(':')
    }

    /// Tool names in deterministic insertion order.
    #[must_use]
    pub fn list_names(&self) -> &[String] {
        &self.order
    }

    /// LLM-facing schema array, filtered by `allowed` (`None` = all).
    /// Unknown names in `allowed` are silently skipped — a remote tool
    /// server may be unreachable at schema-export time.
    #[must_use]
    pub fn get_schemas(&self, allowed: Option<&[String]>) -> Vec<ToolDescriptor> {
        match allowed {
            None => self
                .order
                .iter()
                .filter_map(|name| self.tools.get(name))
                .map(|t| t.descriptor())
                .collect(),
            Some(names) => names
                .iter()
                .filter_map(|name| self.tools.get(name))
                .map(|t| t.descriptor())
                .collect(),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_builtin_distinguishes_remote_tools() {
        assert!(ToolRegistry::is_builtin("read_file"));
        assert!(!ToolRegistry::is_builtin("filesystem:read_file"));
    }

    #[test]
    fn with_defaults_registers_every_builtin() {
        let registry = ToolRegistry::with_defaults();
        for name in ["read_file", "write_file", "edit_file", "glob", "grep", "list_directory", "run_command"] {
            assert!(registry.get(name).is_ok(), "missing tool {name}");
        }
        assert!(registry.get("nonexistent").is_err());
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(crate::ReadFileTool)).unwrap();
        let err = registry.register(Box::new(crate::ReadFileTool)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(_)));
    }

    #[test]
    fn get_schemas_is_order_stable() {
        let registry = ToolRegistry::with_defaults();
        let first = registry.get_schemas(None);
        let second = registry.get_schemas(None);
        let first_names: Vec<_> = first.iter().map(|d| d.name.clone()).collect();
        let second_names: Vec<_> = second.iter().map(|d| d.name.clone()).collect();
        assert_eq!(first_names, second_names);
    }

    #[test]
    fn get_schemas_skips_unknown_names_silently() {
        let registry = ToolRegistry::with_defaults();
        let allowed = vec!["read_file".to_string(), "mcp_server:nonexistent".to_string()];
        let schemas = registry.get_schemas(Some(&allowed));
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "read_file");
    }
}
