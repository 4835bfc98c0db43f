//! Read-only YAML snapshot store.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use strata_core::{Result, StoreError, SyncStore};
use tracing::debug;

/// Snapshot store over a YAML file holding a `{ key: value }` map,
/// optionally nested under a named root section (e.g. `ranks:`).
///
/// Unlike the JSON store, a missing file is not an error: it is created
/// empty at open, so first deployments start from a blank snapshot.
pub struct YamlFileStore<T> {
    path: PathBuf,
    root_key: Option<String>,
    entries: RwLock<HashMap<String, T>>,
}

impl<T> std::fmt::Debug for YamlFileStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlFileStore")
            .field("path", &self.path)
            .field("root_key", &self.root_key)
            .finish_non_exhaustive()
    }
}

impl<T> YamlFileStore<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// Load a flat snapshot: the document itself is the key/value map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_inner(path.into(), None)
    }

    /// Load the map nested under `root_key` (e.g. `ranks`).
    pub fn open_section(path: impl Into<PathBuf>, root_key: impl Into<String>) -> Result<Self> {
        Self::open_inner(path.into(), Some(root_key.into()))
    }

    fn open_inner(path: PathBuf, root_key: Option<String>) -> Result<Self> {
        let entries = load(&path, root_key.as_deref())?;
        debug!(path = %path.display(), entries = entries.len(), "yaml snapshot loaded");
        Ok(Self {
            path,
            root_key,
            entries: RwLock::new(entries),
        })
    }

    /// Re-read the snapshot from disk, replacing the in-memory map.
    pub fn reload(&self) -> Result<()> {
        let entries = load(&self.path, self.root_key.as_deref())?;
        *self.entries.write() = entries;
        Ok(())
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load<T: DeserializeOwned>(path: &Path, root_key: Option<&str>) -> Result<HashMap<String, T>> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::connection)?;
            }
        }
        let _ = File::create(path).map_err(StoreError::connection)?;
        debug!(path = %path.display(), "created empty yaml snapshot");
        return Ok(HashMap::new());
    }

    let file = File::open(path).map_err(StoreError::connection)?;
    let document: serde_yaml::Value =
        serde_yaml::from_reader(BufReader::new(file)).map_err(StoreError::serialization)?;

    // An empty file parses as null.
    if document.is_null() {
        return Ok(HashMap::new());
    }

    let section = match root_key {
        Some(key) => document.get(key).cloned().ok_or_else(|| {
            StoreError::serialization(format!(
                "root key `{key}` missing from {}",
                path.display()
            ))
        })?,
        None => document,
    };

    serde_yaml::from_value(section).map_err(StoreError::serialization)
}

impl<T> SyncStore<T> for YamlFileStore<T>
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
        Err(StoreError::Unsupported("the yaml snapshot store is read-only"))
    }

    fn save_with_ttl(&self, _key: &str, _value: &T, _ttl: Duration) -> Result<bool> {
        Err(StoreError::Unsupported("the yaml snapshot store is read-only"))
    }

    fn delete(&self, _key: &str) -> Result<bool> {
        Err(StoreError::Unsupported("the yaml snapshot store is read-only"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
