//! Local response cache (opt-in, for development): keyed by the SHA-256 of
//! a canonical JSON encoding of `(messages, tools_schema)`, one file per
//! entry, expired by file mtime. Every I/O or (de)serialization failure is
//! swallowed — a cache is never allowed to turn a working call into a
//! failure.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};

use architect_core::Message;

use crate::types::{CompletionResponse, ToolSchema};

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    /// Compute the cache key for a request. Only the streaming callback is
    /// excluded from the key, since it carries no response-shaping
    /// information.
    #[must_use]
    pub fn key_for(messages: &[Message], tools_schema: Option<&[ToolSchema]>) -> String {
        let canonical = serde_json::json!({
            "messages": messages,
            "tools_schema": tools_schema,
        });
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub async fn get(&self, key: &str) -> Option<CompletionResponse> {
        let path = self.entry_path(key);
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        let modified = metadata.modified().ok()?;
        if SystemTime::now().duration_since(modified).ok()? > self.ttl {
            return None;
        }
        let bytes = tokio::fs::read(&path).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub async fn put(&self, key: &str, response: &CompletionResponse) {
        let path = self.entry_path(key);
        if tokio::fs::create_dir_all(&self.dir).await.is_err() {
            return;
        }
        if let Ok(bytes) = serde_json::to_vec(response) {
            let _ = tokio::fs::write(&path, bytes).await;
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FinishReason;
    use architect_cost::Usage;

    fn sample_response() -> CompletionResponse {
        CompletionResponse {
            content: "hello".to_string(),
            tool_calls: vec![],
            finish_reason: FinishReason::EndTurn,
            usage: Usage::new(10, 5),
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path(), Duration::from_secs(3_600));
        let key = "abc";
        cache.put(key, &sample_response()).await;
        let fetched = cache.get(key).await.unwrap();
        assert_eq!(fetched.content, "hello");
    }

    #[tokio::test]
    async fn missing_entry_returns_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path(), Duration::from_secs(3_600));
        assert!(cache.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_returns_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path(), Duration::from_secs(0));
        cache.put("key", &sample_response()).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get("key").await.is_none());
    }

    #[test]
    fn key_is_stable_for_identical_input() {
        let messages = vec![Message::user("hi")];
        let a = ResponseCache::key_for(&messages, None);
        let b = ResponseCache::key_for(&messages, None);
        assert_eq!(a, b);
    }

    #[test]
    fn key_differs_for_different_messages() {
        let a = ResponseCache::key_for(&[Message::user("hi")], None);
        let b = ResponseCache::key_for(&[Message::user("bye")], None);
        assert_ne!(a, b);
    }
}
