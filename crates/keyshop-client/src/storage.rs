//! # Persisted Client State
//!
//! String key-value storage for the two pieces of state that outlive a
//! browsing session: the cart line-item list and the catalog view mode.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartStore ────────► "cart"            = [{"id":"7",...,"quantity":1}]  │
//! │  CatalogSyncEngine ► "productViewMode" = "grid"                         │
//! │                              │                                          │
//! │                  ┌───────────┴───────────┐                              │
//! │                  ▼                       ▼                              │
//! │            MemoryStore              FileStore                           │
//! │            (tests, ephemeral)       <data dir>/<key>.json               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are last-writer-wins. Two clients sharing a `FileStore` directory
//! can overwrite each other; `CartStore::reload_from_storage` picks up the
//! other writer's state.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Storage backend for persisted client state.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> ClientResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> ClientResult<()>;
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// One file per key. Each write goes to its own uniquely named temp file
/// in the same directory, which is then renamed over the target. A crash
/// never leaves a half-written cart, and concurrent writers sharing the
/// directory never collide on the temp file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> ClientResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    /// Store rooted at the platform data directory.
    pub fn in_default_location() -> ClientResult<Self> {
        let dirs = directories::ProjectDirs::from("com", "keyshop", "storefront").ok_or_else(
            || ClientError::StorageFailed("No home directory available for client state".into()),
        )?;
        Self::new(dirs.data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ClientResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ClientError::StorageFailed(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let path = self.path_for(key)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| ClientError::from(e.error))?;
        debug!(key, bytes = value.len(), "Persisted client state");
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
