//! Storage APIs
//!
//! localStorage-style (durable, file-backed) and sessionStorage-style
//! (in-memory) key/value stores.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::StorageError;

/// Key/value backend consumed by the binding engine
pub trait KeyValueStore {
    /// Get item
    fn get_item(&self, key: &str) -> Option<String>;

    /// Set item
    fn set_item(&mut self, key: &str, value: &str);

    /// Remove item
    fn remove_item(&mut self, key: &str);

    /// Remove every item whose key starts with `prefix`, returning how many
    fn clear_prefix(&mut self, prefix: &str) -> usize;

    /// All entries, ordered by key
    fn entries(&self) -> Vec<(String, String)>;
}

/// Storage backend
#[derive(Debug, Default)]
pub struct Storage {
    data: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Storage {
    /// Create in-memory storage (sessionStorage)
    pub fn session() -> Self {
        Self::default()
    }

    /// Open persistent storage (localStorage) backed by a JSON file.
    ///
    /// A missing file is an empty store.
    pub fn local(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Opened storage {} ({} items)", path.display(), data.len());
        Ok(Self { data, path: Some(path) })
    }

    /// Backing file, if persistent
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether writes reach disk
    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Get item
    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Set item
    pub fn set_item(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
        self.persist();
    }

    /// Remove item
    pub fn remove_item(&mut self, key: &str) {
        if self.data.remove(key).is_some() {
            self.persist();
        }
    }

    /// Write to disk now, surfacing errors
    pub fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(&self.data).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;
        fs::write(path, contents).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })
    }

    /// Persist to disk if persistent. Failures are logged, not returned.
    fn persist(&self) {
        if let Err(err) = self.flush() {
            tracing::warn!("Storage write failed: {}", err);
        }
    }
}

impl KeyValueStore for Storage {
    fn get_item(&self, key: &str) -> Option<String> {
        Storage::get_item(self, key).map(str::to_string)
    }

    fn set_item(&mut self, key: &str, value: &str) {
        Storage::set_item(self, key, value);
    }

    fn remove_item(&mut self, key: &str) {
        Storage::remove_item(self, key);
    }

    fn clear_prefix(&mut self, prefix: &str) -> usize {
        let before = self.data.len();
        self.data.retain(|k, _| !k.starts_with(prefix));
        let removed = before - self.data.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}
