//! Desktop platform implementations
//!
//! Provides platform-specific implementations for desktop using the
//! standard library and native crates.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;

use crate::ports::outbound::{StorageError, StorageProvider, TimeProvider};
use crate::state::Platform;

/// Wall-clock time provider using std::time
#[derive(Clone, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Desktop storage provider with file-based persistence
///
/// Stores key-value pairs in a JSON file at:
/// - Linux: ~/.config/player/storage.json
/// - macOS: ~/Library/Application Support/io.topup.player/storage.json
/// - Windows: C:\Users\<User>\AppData\Roaming\topup\player\config\storage.json
#[derive(Clone)]
pub struct DesktopStorageProvider {
    /// Path to the storage file
    storage_path: PathBuf,
    /// In-memory cache of stored values
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for DesktopStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopStorageProvider {
    /// Storage in the platform config directory.
    pub fn new() -> Self {
        let storage_path = if let Some(dirs) = ProjectDirs::from("io", "topup", "player") {
            dirs.config_dir().join("storage.json")
        } else {
            // Fallback to current directory if project dirs unavailable
            PathBuf::from("topup_storage.json")
        };
        Self::with_path(storage_path)
    }

    /// Storage in an explicit file. An unreadable or corrupt file starts empty.
    pub fn with_path(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let cache = load_file(&storage_path);

        tracing::debug!(path = %storage_path.display(), entries = cache.len(), "Desktop storage initialized");

        Self {
            storage_path,
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Puts back the cached entry a failed write replaced, so the cache keeps
    /// matching the file.
    fn restore(&self, key: &str, previous: Option<String>) {
        let Ok(mut guard) = self.cache.write() else {
            return;
        };
        match previous {
            Some(value) => guard.insert(key.to_string(), value),
            None => guard.remove(key),
        };
    }

    /// Persist the cache to disk
    fn persist(&self) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            path: self.storage_path.display().to_string(),
            source,
        };

        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let data = {
            let cache = self.cache.read().map_err(|_| StorageError::LockPoisoned)?;
            serde_json::to_string_pretty(&*cache)?
        };

        fs::write(&self.storage_path, data).map_err(io_error)
    }
}

fn load_file(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse storage file");
                HashMap::new()
            }
        },
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read storage file");
            HashMap::new()
        }
    }
}

impl StorageProvider for DesktopStorageProvider {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = {
            let mut guard = self.cache.write().map_err(|_| StorageError::LockPoisoned)?;
            guard.insert(key.to_string(), value.to_string())
        }; // Release lock before I/O
        self.persist().inspect_err(|_| self.restore(key, previous))
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for storage");
                None
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = {
            let mut guard = self.cache.write().map_err(|_| StorageError::LockPoisoned)?;
            guard.remove(key)
        };
        match removed {
            Some(previous) => self
                .persist()
                .inspect_err(|_| self.restore(key, Some(previous))),
            None => Ok(()),
        }
    }
}

/// Create platform services for desktop
pub fn create_platform(storage_path: Option<PathBuf>) -> Platform {
    let storage = match storage_path {
        Some(path) => DesktopStorageProvider::with_path(path),
        None => DesktopStorageProvider::new(),
    };
    Platform::new(SystemTimeProvider, storage)
}
