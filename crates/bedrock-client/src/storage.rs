//! # Durable Storage
//!
//! A small string key/value store that survives restarts, playing the role
//! of the browser's local storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storage trait                                                          │
//! │  ├── FileStorage   - JSON object on disk, rewritten on every change     │
//! │  └── MemoryStorage - process-local map (tests, --ephemeral runs)        │
//! │                                                                         │
//! │  Keys in use:                                                           │
//! │    id_access_token   id_refresh_token   id_dark_theme                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Durable string key/value storage.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> ClientResult<()>;
}

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> ClientResult<MutexGuard<'_, Entries>> {
    entries
        .lock()
        .map_err(|_| ClientError::Storage("storage lock poisoned".into()))
}

// =============================================================================
// Memory Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// JSON-file backed storage.
///
/// The whole map is held in memory and written back (temp file + rename)
/// after each change, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the storage file, creating parent directories as needed.
    /// A missing file is an empty store; an unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    ClientError::Storage(format!("{} is not a storage file: {}", path.display(), e))
                })?
            }
        } else {
            debug!(?path, "Storage file not found, starting empty");
            BTreeMap::new()
        };

        Ok(FileStorage {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, contents.as_bytes())?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            warn!(path = ?self.path, "Failed to replace storage file");
            return Err(e.into());
        }
        Ok(())
    }
}

/// Writes `contents` readable by the owner only. The file holds bearer tokens.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    // mode only applies on create, so a leftover temp file must go first
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut entries = lock(&self.entries)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let mut entries = lock(&self.entries)?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("storage.json");

        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set("id_access_token", "abc").unwrap();
            storage.set("id_dark_theme", "true").unwrap();
            storage.remove("id_dark_theme").unwrap();
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("id_access_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("id_dark_theme").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(path.with_extension("json.tmp"), "stale").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        storage.set("id_refresh_token", "r1").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            FileStorage::open(&path).unwrap().get("id_refresh_token").unwrap().as_deref(),
            Some("r1")
        );
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileStorage::open(&path).is_err());
    }
}
