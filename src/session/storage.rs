//! Durable client-side key-value storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plays the part of browser `localStorage`: string keys, string values,
//! read synchronously. The session store is the only writer of the
//! `token`/`user` keys; the HTTP transport only reads `token`.
//!
//! Writes are applied as a batch so a pair of keys is never half-written.
//! [`FileStorage`] keeps one JSON object on disk and replaces it with a
//! write-to-temp + rename.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-encoded user record.
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A single mutation inside a storage batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl StorageOp {
    #[must_use]
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        Self::Set { key: key.to_owned(), value: value.into() }
    }

    #[must_use]
    pub fn remove(key: &str) -> Self {
        Self::Remove { key: key.to_owned() }
    }
}

/// String key-value store surviving process restarts.
pub trait Storage: Send + Sync {
    /// Read the value for `key`. Unreadable storage reads as absent.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Apply every op in `ops` as one unit.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the batch could not be persisted; in that
    /// case none of the ops are visible.
    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError>;
}

fn apply_to_map(map: &mut BTreeMap<String, String>, ops: &[StorageOp]) {
    for op in ops {
        match op {
            StorageOp::Set { key, value } => {
                map.insert(key.clone(), value.clone());
            }
            StorageOp::Remove { key } => {
                map.remove(key);
            }
        }
    }
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// JSON-object file on disk, e.g. `~/.config/attendance/storage.json`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Storage backed by `path`. The file and its parent directory are created
    /// lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("storage.json");
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }

    /// Load the whole map. Missing or malformed files read as empty.
    fn load(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "storage read failed");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "storage file malformed; treating as empty");
            BTreeMap::new()
        })
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        let mut map = self.load();
        apply_to_map(&mut map, ops);
        let json = serde_json::to_string_pretty(&map)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&temp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// Process-local storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().map_or(0, |items| items.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        apply_to_map(&mut items, ops);
        Ok(())
    }
}
