//! Key-value storage backends
//!
//! Every backend degrades silently: reads of missing or unreadable data return
//! `None`, failed writes return `false` after logging.

use std::collections::HashMap;

/// Minimal string store used for high scores and settings
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Returns true if the value was persisted
    fn set(&mut self, key: &str, value: &str) -> bool;
}

/// In-memory store (tests, or when nothing better is available)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.items.insert(key.to_string(), value.to_string());
        true
    }
}

/// One JSON file per key inside a data directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Env var overriding the data directory
    pub const DIR_ENV: &'static str = "NEON_TURBO_DATA_DIR";

    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$NEON_TURBO_DATA_DIR`, falling back to `./.neon-turbo`
    pub fn from_env() -> Self {
        let dir = std::env::var_os(Self::DIR_ENV)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::path::PathBuf::from(".neon-turbo"));
        Self::new(dir)
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        if let Err(err) = std::fs::create_dir_all(&self.dir) {
            log::warn!("Storage unavailable at {}: {err}", self.dir.display());
            return false;
        }
        match std::fs::write(self.path_for(key), value) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to write {key}: {err}");
                false
            }
        }
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable");
            return false;
        };
        storage.set_item(key, value).is_ok()
    }
}

/// The platform's persistent store
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(LocalStore)
}

/// The platform's persistent store
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn KeyValueStore> {
    Box::new(FileStore::from_env())
}
