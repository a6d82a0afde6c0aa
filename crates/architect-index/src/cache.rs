//! On-disk cache for a built [`RepoIndex`], keyed by a hash of the
//! workspace root path. A cache hit within the TTL skips a full tree walk
//! on repeated runs against the same workspace. Every I/O or
//! (de)serialization failure is swallowed: a cache miss never turns into
//! a hard error, it just triggers a rebuild.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::index::RepoIndex;

#[derive(Debug, Clone)]
pub struct IndexCache {
    dir: PathBuf,
    ttl: Duration,
}

impl IndexCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { dir: dir.into(), ttl }
    }

    /// Default 5-minute TTL cache rooted at `<workspace>/.architect/index_cache`.
    #[must_use]
    pub fn for_workspace(workspace_root: &Path) -> Self {
        Self::new(
            workspace_root.join(".architect").join("index_cache"),
            Duration::from_secs(300),
        )
    }

    #[must_use]
    pub fn key_for(workspace_root: &Path) -> String {
        let canonical = workspace_root
            .canonicalize()
            .unwrap_or_else(|_| workspace_root.to_path_buf());
        let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub async fn get(&self, workspace_root: &Path) -> Option<RepoIndex> {
        let path = self.entry_path(workspace_root);
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        let modified = metadata.modified().ok()?;
        if modified.elapsed().ok()? > self.ttl {
            return None;
        }
        let bytes = tokio::fs::read(&path).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub async fn put(&self, workspace_root: &Path, index: &RepoIndex) {
        let path = self.entry_path(workspace_root);
        if tokio::fs::create_dir_all(&self.dir).await.is_err() {
            return;
        }
        if let Ok(bytes) = serde_json::to_vec(index) {
            let _ = tokio::fs::write(&path, bytes).await;
        }
    }

    /// Build the index, serving a fresh cache entry if one exists, and
    /// writing back whatever was (re)built.
    pub async fn get_or_build(&self, workspace_root: &Path) -> crate::error::IndexResult<RepoIndex> {
        if let Some(cached) = self.get(workspace_root).await {
            tracing::debug!(workspace = %workspace_root.display(), "repo index cache hit");
            return Ok(cached);
        }
        tracing::debug!(workspace = %workspace_root.display(), "repo index cache miss, rebuilding");
        let fresh = RepoIndex::build(workspace_root)?;
        self.put(workspace_root, &fresh).await;
        Ok(fresh)
    }

    fn entry_path(&self, workspace_root: &Path) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key_for(workspace_root)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_miss_builds_and_persists() {
        let workspace = tempfile::tempdir().unwrap();
        std::fs::write(workspace.path().join("a.rs"), "fn a() {}\n").unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = IndexCache::new(cache_dir.path(), Duration::from_secs(300));

        assert!(cache.get(workspace.path()).await.is_none());
        let index = cache.get_or_build(workspace.path()).await.unwrap();
        assert_eq!(index.total_files, 1);
        assert!(cache.get(workspace.path()).await.is_some());
    }

    #[tokio::test]
    async fn expired_entry_triggers_rebuild() {
        let workspace = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = IndexCache::new(cache_dir.path(), Duration::from_secs(0));

        let _ = cache.get_or_build(workspace.path()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get(workspace.path()).await.is_none());
    }

    #[test]
    fn key_is_stable_for_the_same_root() {
        let a = IndexCache::key_for(Path::new("/tmp/workspace"));
        let b = IndexCache::key_for(Path::new("/tmp/workspace"));
        assert_eq!(a, b);
    }
}
