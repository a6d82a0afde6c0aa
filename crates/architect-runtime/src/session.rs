//! The persisted `Session` document (§3) and its on-disk store.
//!
//! Distinct from [`architect_core::SessionId`], which binds messages and
//! tool calls within one in-memory run: a `Session`'s `session_id` is a
//! stamped, sortable string (`YYYYMMDD-HHMMSS-NNNNNN`) because it doubles
//! as the document's filename.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use architect_core::{AgentState, AgentStatus, Message, StopReason};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RuntimeError, RuntimeResult};

/// Messages are truncated to the most recent 30 once a session exceeds 50,
/// per §3's data model. Keeps the persisted document bounded for long runs
/// without losing recent context on reload.
const TRUNCATE_ABOVE: usize = 50;
const TRUNCATE_TO: usize = 30;

/// Generate a stamped session id: a sortable timestamp plus a random
/// suffix to disambiguate two sessions started in the same second.
#[must_use]
pub fn generate_session_id() -> String {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let suffix: u32 = rand::random::<u32>() % 1_000_000;
    format!("{stamp}-{suffix:06}")
}

/// One persisted agent run (§3). Reconstructed from [`AgentState`] at every
/// step boundary and written to `<workspace>/.architect/sessions/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub task: String,
    pub agent: String,
    pub model: String,
    pub status: AgentStatus,
    pub steps_count: usize,
    pub messages: Vec<Message>,
    pub files_modified: BTreeSet<PathBuf>,
    pub total_cost: f64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stop_reason: Option<StopReason>,
    pub metadata: serde_json::Map<String, Value>,
}

impl Session {
    #[must_use]
    pub fn new(agent: impl Into<String>, model: impl Into<String>, task: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: generate_session_id(),
            task: task.into(),
            agent: agent.into(),
            model: model.into(),
            status: AgentStatus::Running,
            steps_count: 0,
            messages: Vec::new(),
            files_modified: BTreeSet::new(),
            total_cost: 0.0,
            started_at: now,
            updated_at: now,
            stop_reason: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Refresh this document from the Agent Loop's live state. Called at
    /// every step boundary (§4.11 step 8).
    pub fn sync_from_state(&mut self, state: &AgentState, total_cost: f64) {
        self.status = state.status;
        self.stop_reason = state.stop_reason;
        self.steps_count = state.step_count();
        self.total_cost = total_cost;
        self.updated_at = Utc::now();
        self.messages = if state.messages.len() > TRUNCATE_ABOVE {
            state.messages[state.messages.len() - TRUNCATE_TO..].to_vec()
        } else {
            state.messages.clone()
        };
    }

    /// Record a path touched by a successful write-like tool call this
    /// step.
    pub fn record_file_modified(&mut self, path: PathBuf) {
        self.files_modified.insert(path);
    }
}

/// Persists [`Session`] documents one JSON file per session, write-temp-
/// then-rename for crash safety, grounded on the same atomic-write
/// discipline the Agent Loop uses for every other persisted artifact.
pub struct SessionStore {
    sessions_dir: PathBuf,
    dir_ensured: AtomicBool,
}

impl SessionStore {
    #[must_use]
    pub fn new(sessions_dir: impl AsRef<Path>) -> Self {
        let sessions_dir = sessions_dir.as_ref().to_path_buf();
        let dir_exists = sessions_dir.is_dir();
        Self { sessions_dir, dir_ensured: AtomicBool::new(dir_exists) }
    }

    fn ensure_dir(&self) -> RuntimeResult<()> {
        if self.dir_ensured.load(Ordering::Relaxed) {
            return Ok(());
        }
        std::fs::create_dir_all(&self.sessions_dir)?;
        self.dir_ensured.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir.join(format!("{session_id}.json"))
    }

    /// Save atomically: write to a temp file, then rename over the target.
    pub fn save(&self, session: &Session) -> RuntimeResult<()> {
        self.ensure_dir()?;
        let path = self.session_path(&session.session_id);
        let json = serde_json::to_string_pretty(session)?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &json)?;
        std::fs::rename(&temp_path, &path).inspect_err(|_| {
            let _ = std::fs::remove_file(&temp_path);
        })?;

        tracing::debug!(session_id = %session.session_id, path = ?path, "session saved");
        Ok(())
    }

    pub fn load(&self, session_id: &str) -> RuntimeResult<Option<Session>> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn delete(&self, session_id: &str) -> RuntimeResult<()> {
        let path = self.session_path(session_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// List session ids, most recently modified first. Empty if the
    /// sessions directory doesn't exist yet.
    pub fn list(&self) -> RuntimeResult<Vec<String>> {
        if !self.sessions_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.sessions_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                let modified = entry.metadata().and_then(|m| m.modified()).unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                entries.push((stem.to_string(), modified));
            }
        }

        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries.into_iter().map(|(id, _)| id).collect())
    }

    /// Delete sessions whose file has not been modified in `max_age_days`.
    /// Returns the number removed.
    pub fn cleanup_old(&self, max_age_days: u64) -> RuntimeResult<usize> {
        if !self.sessions_dir.is_dir() {
            return Ok(0);
        }
        let cutoff = std::time::SystemTime::now()
            .checked_sub(std::time::Duration::from_secs(max_age_days * 86_400))
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.sessions_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                let modified = entry.metadata().and_then(|m| m.modified()).unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                if modified < cutoff {
                    std::fs::remove_file(&path)?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    /// Load the most recently modified session, if any.
    pub fn most_recent(&self) -> RuntimeResult<Option<Session>> {
        match self.list()?.first() {
            Some(id) => self.load(id),
            None => Ok(None),
        }
    }
}

/// Resolve a session argument that may be a full stamped id or a bare
/// trailing suffix (as a user might type on the CLI). Returns
/// [`RuntimeError::InvalidSessionId`] only on malformed input, never on a
/// miss — callers distinguish "not found" from "loaded" on the `Option`.
pub fn resolve_session_id(raw: &str) -> RuntimeResult<String> {
    if raw.trim().is_empty() {
        return Err(RuntimeError::InvalidSessionId(raw.to_string()));
    }
    Ok(raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::AgentState;

    #[test]
    fn generated_ids_are_unique_and_timestamp_prefixed() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(a.len() >= "20260101-000000-000000".len());
    }

    #[test]
    fn session_store_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path().join("sessions"));
        let session = Session::new("builder", "claude-3-5-sonnet-20241022", "do the thing");
        store.save(&session).unwrap();

        let loaded = store.load(&session.session_id).unwrap().unwrap();
        assert_eq!(loaded.session_id, session.session_id);
        assert_eq!(loaded.task, "do the thing");
    }

    #[test]
    fn session_store_lazy_dir_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("sessions");
        let store = SessionStore::new(&dir);
        assert!(!dir.exists());
        store.save(&Session::new("builder", "m", "t")).unwrap();
        assert!(dir.exists());
    }

    #[test]
    fn missing_session_load_returns_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path());
        assert!(store.load("nonexistent").unwrap().is_none());
    }

    #[test]
    fn list_sorts_most_recent_first() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::new(tmp.path());
        let first = Session::new("a", "m", "t1");
        store.save(&first).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = Session::new("b", "m", "t2");
        store.save(&second).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0], second.session_id);
    }

    #[test]
    fn sync_from_state_truncates_long_histories() {
        let mut session = Session::new("a", "m", "t");
        let mut state = AgentState::new("sys", "hi");
        for i in 0..60 {
            state.messages.push(Message::user(format!("turn {i}")));
        }
        session.sync_from_state(&state, 1.23);
        assert_eq!(session.messages.len(), TRUNCATE_TO);
        assert_eq!(session.total_cost, 1.23);
    }

    #[test]
    fn sync_from_state_keeps_short_histories_intact() {
        let mut session = Session::new("a", "m", "t");
        let state = AgentState::new("sys", "hi");
        session.sync_from_state(&state, 0.0);
        assert_eq!(session.messages.len(), 2);
    }
}
