//! Read-only JSON snapshot store.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use strata_core::{Result, StoreError, SyncStore};
use tracing::debug;

/// Snapshot store over a JSON file holding a `{ key: value }` object.
///
/// The backing file must exist; it is read once at open and again on
/// [`reload`](Self::reload). Reads are served from memory.
pub struct JsonFileStore<T> {
    path: PathBuf,
    entries: RwLock<HashMap<String, T>>,
}

impl<T> std::fmt::Debug for JsonFileStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<T> JsonFileStore<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// Load the snapshot at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = load(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "json snapshot loaded");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Re-read the snapshot from disk, replacing the in-memory map.
    pub fn reload(&self) -> Result<()> {
        let entries = load(&self.path)?;
        *self.entries.write() = entries;
        Ok(())
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    let file = File::open(path).map_err(StoreError::connection)?;
    serde_json::from_reader(BufReader::new(file)).map_err(StoreError::serialization)
}

impl<T> SyncStore<T> for JsonFileStore<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    fn fetch(&self, key: &str) -> Result<Option<T>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn fetch_all(&self) -> Result<Vec<T>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn save(&self, _key: &str, _value: &T) -> Result<bool> {
        Err(StoreError::Unsupported("the json snapshot store is read-only"))
    }

    fn save_with_ttl(&self, _key: &str, _value: &T, _ttl: Duration) -> Result<bool> {
        Err(StoreError::Unsupported("the json snapshot store is read-only"))
    }

    fn delete(&self, _key: &str) -> Result<bool> {
        Err(StoreError::Unsupported("the json snapshot store is read-only"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use strata_core::ErrorKind;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    struct Rank {
        title: String,
        weight: u32,
    }

    fn write_snapshot(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("ranks.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    const SNAPSHOT: &str = r#"{
        "admin": { "title": "Administrator", "weight": 100 },
        "member": { "title": "Member", "weight": 10 }
    }"#;

    #[test]
    fn fetch_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Rank> =
            JsonFileStore::open(write_snapshot(&dir, SNAPSHOT)).unwrap();

        let admin = store.fetch("admin").unwrap().unwrap();
        assert_eq!(admin.title, "Administrator");
        assert_eq!(admin.weight, 100);
    }

    #[test]
    fn fetch_absent_key_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Rank> =
            JsonFileStore::open(write_snapshot(&dir, SNAPSHOT)).unwrap();
        assert_eq!(store.fetch("owner").unwrap(), None);
    }

    #[test]
    fn fetch_all_returns_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Rank> =
            JsonFileStore::open(write_snapshot(&dir, SNAPSHOT)).unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 2);
    }

    #[test]
    fn empty_object_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Rank> = JsonFileStore::open(write_snapshot(&dir, "{}")).unwrap();
        assert_eq!(store.fetch("anything").unwrap(), None);
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileStore::<Rank>::open(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn malformed_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            JsonFileStore::<Rank>::open(write_snapshot(&dir, "not json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(&dir, SNAPSHOT);
        let store: JsonFileStore<Rank> = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 2);

        std::fs::write(
            &path,
            r#"{ "admin": { "title": "Administrator", "weight": 100 } }"#,
        )
        .unwrap();
        store.reload().unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn mutations_are_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<Rank> =
            JsonFileStore::open(write_snapshot(&dir, SNAPSHOT)).unwrap();

        let rank = Rank {
            title: "Owner".into(),
            weight: 1000,
        };
        assert_eq!(
            store.save("owner", &rank).unwrap_err().kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            store
                .save_with_ttl("owner", &rank, Duration::from_secs(1))
                .unwrap_err()
                .kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            store.delete("admin").unwrap_err().kind(),
            ErrorKind::Unsupported
        );
    }
}
