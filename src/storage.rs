//! Key/value storage scopes
//!
//! Mirrors the browser's `localStorage`/`sessionStorage` contract: string keys,
//! string values, every call fallible. Callers in the terminal treat failures
//! as "state unavailable" and keep going.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FolioError, Result};

/// Plain quest progress (stage, inventory, codes, active flag)
pub const QUEST_STATE_KEY: &str = "terminalQuestState";
/// Obfuscated expected quest codes
pub const QUEST_EXPECTED_KEY: &str = "terminalQuestExpectedEnc";
/// Session flag set once the boot sequence has played
pub const BOOTED_KEY: &str = "terminalBooted";
/// Set once the keyboard shortcut hint was shown
pub const HOTKEY_HINT_KEY: &str = "hasSeenHotkeyHint";
/// JSON array of favorite project ids
pub const FAVORITES_KEY: &str = "portfolio:favorites";
/// Color theme name
pub const THEME_KEY: &str = "theme";
/// Accent color as an HSL triple string
pub const ACCENT_KEY: &str = "portfolio:accent-hsl";

/// A string key/value store
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize a JSON value, swallowing every failure
///
/// Missing keys, storage errors and malformed JSON all come back as `None`;
/// the latter two are logged.
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, %err, "storage read failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, %err, "discarding malformed stored value");
            None
        }
    }
}

/// Serialize and write a JSON value; returns whether the write landed
pub fn write_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> bool {
    let encoded = match serde_json::to_string(value) {
        Ok(encoded) => encoded,
        Err(err) => {
            tracing::warn!(key, %err, "failed to encode value for storage");
            return false;
        }
    };
    write_raw(storage, key, &encoded)
}

/// Write a raw string, logging and swallowing errors
pub fn write_raw(storage: &dyn Storage, key: &str, value: &str) -> bool {
    match storage.set(key, value) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(key, %err, "storage write failed");
            false
        }
    }
}

/// Read a raw string, logging and swallowing errors
pub fn read_raw(storage: &dyn Storage, key: &str) -> Option<String> {
    storage.get(key).unwrap_or_else(|err| {
        tracing::warn!(key, %err, "storage read failed");
        None
    })
}

/// Remove a key, logging and swallowing errors
pub fn remove_quietly(storage: &dyn Storage, key: &str) {
    if let Err(err) = storage.remove(key) {
        tracing::warn!(key, %err, "storage remove failed");
    }
}

/// In-memory storage, shareable across instances via `Arc`
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object on disk
///
/// The file is read once on open and rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) a storage file
    ///
    /// A missing file starts empty. An unreadable or corrupt file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => HashMap::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<()> {
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, text).map_err(|e| {
            FolioError::StorageError(format!(
                "Failed to write storage file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// The two storage scopes a terminal sees
#[derive(Clone)]
pub struct StorageScopes {
    /// Survives reloads (`localStorage`)
    pub local: Arc<dyn Storage>,
    /// Lives for the browsing session (`sessionStorage`)
    pub session: Arc<dyn Storage>,
}

impl StorageScopes {
    pub fn new(local: Arc<dyn Storage>, session: Arc<dyn Storage>) -> Self {
        Self { local, session }
    }

    /// Fresh in-memory scopes
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(MemoryStorage::new()),
            session: Arc::new(MemoryStorage::new()),
        }
    }
}

impl std::fmt::Debug for StorageScopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageScopes").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod failing {
    use super::*;

    /// Storage whose every call fails, like a browser with storage disabled
    pub(crate) struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(FolioError::StorageError("storage disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(FolioError::StorageError("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(FolioError::StorageError("storage disabled".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::failing::FailingStorage;
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").unwrap().is_none());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_read_json_swallows_malformed() {
        let storage = MemoryStorage::new();
        storage.set(FAVORITES_KEY, "[not json").unwrap();
        let value: Option<Vec<String>> = read_json(&storage, FAVORITES_KEY);
        assert!(value.is_none());
    }

    #[test]
    fn test_helpers_swallow_storage_failures() {
        let storage = FailingStorage;
        let value: Option<Vec<String>> = read_json(&storage, FAVORITES_KEY);
        assert!(value.is_none());
        assert!(!write_json(&storage, FAVORITES_KEY, &vec!["a"]));
        assert!(read_raw(&storage, THEME_KEY).is_none());
        remove_quietly(&storage, THEME_KEY);
    }

    #[test]
    fn test_file_storage_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(THEME_KEY, "light").unwrap();
        storage.set(BOOTED_KEY, "1").unwrap();
        storage.remove(BOOTED_KEY).unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert!(reopened.get(BOOTED_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{{{").unwrap();
        assert!(FileStorage::open(&path).is_err());
    }
}
