//! A single hook definition: a subprocess command bound to a lifecycle
//! event.

use serde::{Deserialize, Serialize};

use crate::event::HookEvent;

/// A hook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hook {
    pub name: String,
    /// Shell command string (run via `sh -c`). May contain the legacy
    /// `{file}` placeholder, substituted with the edited path at
    /// invocation time.
    pub command: String,
    pub event: HookEvent,
    /// Regex matched against the tool or event name this invocation
    /// concerns. `None` matches unconditionally.
    #[serde(default)]
    pub matcher: Option<String>,
    /// Glob patterns a tool hook's file path must match (empty = no
    /// filtering).
    #[serde(default)]
    pub file_patterns: Vec<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Fire-and-forget: spawned but not awaited.
    #[serde(default, rename = "async")]
    pub is_async: bool,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_enabled() -> bool {
    true
}

impl Hook {
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>, event: HookEvent) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            event,
            matcher: None,
            file_patterns: Vec::new(),
            timeout_seconds: default_timeout_seconds(),
            enabled: true,
            is_async: false,
        }
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matcher = Some(matcher.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn async_hook(mut self) -> Self {
        self.is_async = true;
        self
    }
}

/// Recognize a legacy `post_edit` hook group, mapping it onto
/// `post_tool_use` with the matcher `edit_file|write_file|apply_patch`
/// (§4.5 backward compatibility note).
#[must_use]
pub fn normalize_legacy_post_edit(mut hook: Hook) -> Hook {
    const LEGACY_MATCHER: &str = "edit_file|write_file|apply_patch";
    if hook.matcher.as_deref() == Some("post_edit") {
        hook.event = HookEvent::PostToolUse;
        hook.matcher = Some(LEGACY_MATCHER.to_string());
    }
    hook
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_post_edit_maps_to_post_tool_use() {
        let hook = Hook::new("fmt", "rustfmt {file}", HookEvent::PostToolUse)
            .with_matcher("post_edit");
        let normalized = normalize_legacy_post_edit(hook);
        assert_eq!(normalized.event, HookEvent::PostToolUse);
        assert_eq!(normalized.matcher.as_deref(), Some("edit_file|write_file|apply_patch"));
    }

    #[test]
    fn non_legacy_hook_is_unchanged() {
        let hook = Hook::new("fmt", "rustfmt {file}", HookEvent::PostToolUse)
            .with_matcher("edit_file");
        let normalized = normalize_legacy_post_edit(hook.clone());
        assert_eq!(normalized.matcher, hook.matcher);
    }
}
