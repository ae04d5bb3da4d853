use super::types::{VersionEntry, VersionMap};
use super::StoreError;
use crate::utils::get_versions_path;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// File-backed version store
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    /// Open the store kept in `work_dir`. Nothing is read or written yet.
    pub fn new(work_dir: &Path) -> Self {
        Self {
            path: get_versions_path(work_dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Is there an entry for `filename`?
    pub async fn exists(&self, filename: &str) -> bool {
        self.read_all()
            .await
            .is_some_and(|data| data.contains_key(filename))
    }

    /// Read the whole store.
    ///
    /// Returns `None` when the store file does not exist yet or cannot be
    /// decoded.
    pub async fn read_all(&self) -> Option<VersionMap> {
        match self.load().await {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read version store");
                None
            }
        }
    }

    /// Get the entry for a single file
    pub async fn get(&self, filename: &str) -> Option<VersionEntry> {
        self.read_all()
            .await
            .and_then(|mut data| data.remove(filename))
    }

    /// Add an entry for a file that has never been registered.
    ///
    /// Creates the store file if it does not exist.
    pub async fn create(&self, filename: &str, entry: VersionEntry) -> Result<(), StoreError> {
        let mut data = self.load().await?.unwrap_or_default();

        if data.contains_key(filename) {
            return Err(StoreError::DuplicateEntry(filename.to_string()));
        }

        data.insert(filename.to_string(), entry);
        self.write(&data).await
    }

    /// Replace the entry for a file, inserting it if missing
    pub async fn update(&self, filename: &str, entry: VersionEntry) -> Result<(), StoreError> {
        let mut data = self.load().await?.ok_or(StoreError::Uninitialized)?;

        data.remove(filename);
        data.insert(filename.to_string(), entry);
        self.write(&data).await
    }

    /// Remove the entry for a file. Missing entries are ignored.
    pub async fn delete(&self, filename: &str) -> Result<(), StoreError> {
        let Some(mut data) = self.load().await? else {
            return Ok(());
        };

        if data.remove(filename).is_some() {
            self.write(&data).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Option<VersionMap>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        let data: VersionMap = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Rewrite the whole document through a temp file + rename
    async fn write(&self, data: &VersionMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string(data)?;
        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_all_without_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());
        assert!(store.read_all().await.is_none());
        assert!(!store.exists("main.py").await);
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        store
            .create("main.py", VersionEntry::new("aaa", "bbb"))
            .await
            .unwrap();

        assert!(store.exists("main.py").await);
        let entry = store.get("main.py").await.unwrap();
        assert_eq!(entry, VersionEntry::new("aaa", "bbb"));
        assert!(!dir.path().join("versions.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        store.create("main.py", VersionEntry::new("a", "a")).await.unwrap();
        let result = store.create("main.py", VersionEntry::new("b", "b")).await;

        assert!(matches!(result, Err(StoreError::DuplicateEntry(name)) if name == "main.py"));
        assert_eq!(store.get("main.py").await.unwrap().current, "a");
    }

    #[tokio::test]
    async fn test_update_requires_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        let result = store.update("main.py", VersionEntry::new("a", "a")).await;
        assert!(matches!(result, Err(StoreError::Uninitialized)));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_update_replaces_single_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        store.create("a.py", VersionEntry::new("1", "1")).await.unwrap();
        store.create("b.py", VersionEntry::new("2", "2")).await.unwrap();
        store.update("a.py", VersionEntry::new("3", "3")).await.unwrap();

        let data = store.read_all().await.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["a.py"], VersionEntry::new("3", "3"));
        assert_eq!(data["b.py"], VersionEntry::new("2", "2"));
    }

    #[tokio::test]
    async fn test_delete_is_noop_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        store.delete("ghost.py").await.unwrap();
        store.create("a.py", VersionEntry::new("1", "1")).await.unwrap();
        store.delete("ghost.py").await.unwrap();
        store.delete("a.py").await.unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_store_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());
        fs::write(store.path(), "{not json").await.unwrap();

        assert!(store.read_all().await.is_none());
        let result = store.update("a.py", VersionEntry::new("1", "1")).await;
        assert!(matches!(result, Err(StoreError::JsonError(_))));
    }

    #[tokio::test]
    async fn test_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());
        store.create("main.py", VersionEntry::new("c", "l")).await.unwrap();

        let raw = fs::read_to_string(store.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["main.py"]["current"], "c");
        assert_eq!(value["main.py"]["latest"], "l");
    }
}
