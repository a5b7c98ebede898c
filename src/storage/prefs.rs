// src/storage/prefs.rs

//! Persistence collaborator for user preferences.
//!
//! Only threshold and panel-position preferences go through here. Every
//! failure is swallowed after a warning and the caller falls back to its
//! default; an unavailable store must never abort core operation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Key under which the selected threshold is stored.
pub const THRESHOLD_KEY: &str = "threshold";

/// Key under which the panel position is stored.
pub const PANEL_POSITION_KEY: &str = "panel_position";

/// Minimal get/set preference store.
pub trait PrefStore {
    /// Read a preference; `None` when absent or the store is unavailable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a preference. Failures are swallowed.
    fn set(&self, key: &str, value: &str);
}

/// JSON-file backed store.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> HashMap<String, String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Preference file {:?} unreadable: {e}", self.path);
                HashMap::new()
            }
        }
    }
}

impl PrefStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());

        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(&map)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            fs::write(&self.path, content)
        };
        if let Err(e) = write() {
            log::warn!("Failed to persist preference {key}: {e}");
        }
    }
}

/// In-memory store used in tests and when no file location is configured.
#[derive(Default)]
pub struct MemoryStore {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.borrow_mut().insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("prefs.json"));

        assert_eq!(store.get(THRESHOLD_KEY), None);
        store.set(THRESHOLD_KEY, "250");
        assert_eq!(store.get(THRESHOLD_KEY), Some("250".into()));

        store.set(PANEL_POSITION_KEY, "10,20");
        assert_eq!(store.get(THRESHOLD_KEY), Some("250".into()));
    }

    #[test]
    fn test_unwritable_path_is_swallowed() {
        // A directory path cannot be written as a file; the set must not
        // panic or error out.
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.set(THRESHOLD_KEY, "100");
        assert_eq!(store.get(THRESHOLD_KEY), None);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert_eq!(store.get(THRESHOLD_KEY), None);
    }
}
