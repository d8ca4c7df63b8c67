//! Local key-value storage.
//!
//! The board keeps all durable state in a flat string-to-string store, the
//! same shape as a browser's `localStorage`. Two backends:
//! - `MemoryStorage` - process lifetime only (tests, ephemeral runs)
//! - `FileStorage` - one JSON object on disk, rewritten on every write

use charlie_common::{CharlieError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Synchronous key-value persistence contract.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

fn poisoned<T>(_: T) -> CharlieError {
    CharlieError::Storage("storage lock poisoned".to_string())
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// File-backed storage (one JSON object per profile)
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file.
    ///
    /// A missing file opens empty. A malformed file is logged and also opens
    /// empty; it is overwritten by the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Storage file is malformed, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(CharlieError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::debug!(path = ?path, keys = items.len(), "Opened local storage");

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy, write it out, and only then make it visible
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        let mut next = items.clone();
        change(&mut next);
        self.flush(&next)?;
        *items = next;
        Ok(())
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let io_err = |e: std::io::Error| {
            CharlieError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let data = serde_json::to_string_pretty(items)
            .map_err(|e| CharlieError::Storage(e.to_string()))?;

        // Write-then-rename so a crash never leaves a half-written profile
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|items| {
            items.remove(key);
        })
    }
}
