//! Local cache tier: a small key-value store the layout service writes
//! through on every save.
//!
//! DESIGN
//! ======
//! The store is an injected `LocalStore` rather than a global. Keys follow
//! `layout:{facility_id}:{floor}` and values are JSON-encoded layout
//! snapshots. Operations are synchronous; the file-backed store rewrites its
//! file on every mutation (write to a temp file, then rename), which keeps a
//! crash from leaving a torn cache behind.

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

/// Prefix shared by every layout key.
pub const LAYOUT_KEY_PREFIX: &str = "layout:";

#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("local cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("local cache encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("local cache lock poisoned")]
    Poisoned,
}

/// Key-value storage for the local tier.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;

    /// All keys starting with `prefix`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, LocalStoreError>;
}

/// Cache key for one floor of one facility.
#[must_use]
pub fn layout_key(facility_id: Uuid, floor: i32) -> String {
    format!("{LAYOUT_KEY_PREFIX}{facility_id}:{floor}")
}

/// Key prefix covering every floor of `facility_id`.
#[must_use]
pub fn facility_prefix(facility_id: Uuid) -> String {
    format!("{LAYOUT_KEY_PREFIX}{facility_id}:")
}

/// Split a layout key back into its facility and floor.
#[must_use]
pub fn parse_layout_key(key: &str) -> Option<(Uuid, i32)> {
    let rest = key.strip_prefix(LAYOUT_KEY_PREFIX)?;
    let (facility, floor) = rest.rsplit_once(':')?;
    let facility = Uuid::parse_str(facility).ok()?;
    let floor = floor.parse().ok()?;
    Some((facility, floor))
}

fn scan(entries: &BTreeMap<String, String>, prefix: &str) -> Vec<String> {
    entries
        .range(prefix.to_owned()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, _)| k.clone())
        .collect()
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, LocalStoreError> {
        self.entries.lock().map_err(|_| LocalStoreError::Poisoned)
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, LocalStoreError> {
        Ok(scan(&*self.lock()?, prefix))
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Store persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading any existing contents. A missing
    /// file starts an empty store; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, LocalStoreError> {
        self.entries.lock().map_err(|_| LocalStoreError::Poisoned)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), LocalStoreError> {
        let encoded = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut entries = self.lock()?;
        let previous = entries.insert(key.to_owned(), value.to_owned());
        if let Err(e) = self.flush(&entries) {
            match previous {
                Some(prev) => entries.insert(key.to_owned(), prev),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let mut entries = self.lock()?;
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush(&entries) {
            entries.insert(key.to_owned(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, LocalStoreError> {
        Ok(scan(&*self.lock()?, prefix))
    }
}
