//! Per-mapping persisted snapshots of the last successful fetch.
//!
//! Cache entries survive restarts so the agent can fall back to
//! last-known-good values when the store rejects its credential.

use crate::error::StorageError;
use crate::mappings::Mapping;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;
use vault_client::SecretSnapshot;

/// File-backed snapshot store, one JSON document per mapping.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Filesystem-safe slug for a secret path.
    ///
    /// Every character outside `[A-Za-z0-9_-]` becomes `_`. Distinct paths
    /// can collapse to the same slug and then share a cache slot; that is
    /// an accepted limitation.
    #[must_use]
    pub fn slug(secret_path: &str) -> String {
        secret_path
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn entry_path(&self, mapping: &Mapping) -> PathBuf {
        self.dir.join(format!("{}.json", Self::slug(&mapping.secret_path)))
    }

    /// Load the cached snapshot for a mapping, `None` if never saved.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the entry exists but cannot be read or
    /// parsed.
    pub async fn load(&self, mapping: &Mapping) -> Result<Option<SecretSnapshot>, StorageError> {
        let path = self.entry_path(mapping);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Persist a snapshot for a mapping.
    ///
    /// The document is written to a temporary file and renamed into place,
    /// so a concurrent reader never observes a truncated snapshot.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the directory or entry cannot be
    /// written.
    pub async fn save(
        &self,
        mapping: &Mapping,
        snapshot: &SecretSnapshot,
    ) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.entry_path(mapping);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(snapshot)?;

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), keys = snapshot.len(), "Saved cache entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(pairs: &[(&str, &str)]) -> SecretSnapshot {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>()
    }

    #[test]
    fn test_slug_replaces_unsafe_characters() {
        assert_eq!(CacheStore::slug("app/db"), "app_db");
        assert_eq!(CacheStore::slug("app/db.prod"), "app_db_prod");
        assert_eq!(CacheStore::slug("plain-name_1"), "plain-name_1");
    }

    #[tokio::test]
    async fn test_load_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mapping = Mapping::new("app/db", "db.env");

        assert!(store.load(&mapping).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mapping = Mapping::new("app/db", "db.env");
        let snap = snapshot(&[("USER", "alice"), ("PASS", "x1")]);

        store.save(&mapping, &snap).await.unwrap();

        assert_eq!(store.load(&mapping).await.unwrap(), Some(snap));
    }

    #[tokio::test]
    async fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested/cache"));
        let mapping = Mapping::new("app/db", "db.env");

        store.save(&mapping, &snapshot(&[("K", "v")])).await.unwrap();

        assert!(store.load(&mapping).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_colliding_slugs_share_a_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let slash = Mapping::new("app/db", "a.env");
        let underscore = Mapping::new("app_db", "b.env");

        store.save(&slash, &snapshot(&[("K", "from-slash")])).await.unwrap();

        let loaded = store.load(&underscore).await.unwrap().unwrap();
        assert_eq!(loaded.get("K").map(String::as_str), Some("from-slash"));
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mapping = Mapping::new("app/db", "db.env");

        tokio::fs::create_dir_all(dir.path()).await.unwrap();
        tokio::fs::write(dir.path().join("app_db.json"), b"not json")
            .await
            .unwrap();

        assert!(matches!(
            store.load(&mapping).await,
            Err(StorageError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_no_leftover_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let mapping = Mapping::new("app/db", "db.env");

        store.save(&mapping, &snapshot(&[("K", "v")])).await.unwrap();

        assert!(!dir.path().join("app_db.json.tmp").exists());
        assert!(dir.path().join("app_db.json").exists());
    }
}
