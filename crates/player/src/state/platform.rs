//! Platform DI Container
//!
//! `Platform` aggregates the platform-specific adapters behind their port
//! traits so services receive one injectable value.
//!
//! Usage:
//! - Created by `create_platform()` in infrastructure/platform/desktop.rs
//! - Built from in-memory adapters in tests

use std::fmt;
use std::sync::Arc;

use crate::ports::outbound::{StorageError, StorageProvider, TimeProvider};

/// Unified platform services container
#[derive(Clone)]
pub struct Platform {
    time: Arc<dyn TimeProvider>,
    storage: Arc<dyn StorageProvider>,
}

impl Platform {
    pub fn new<T, S>(time: T, storage: S) -> Self
    where
        T: TimeProvider + 'static,
        S: StorageProvider + 'static,
    {
        Self {
            time: Arc::new(time),
            storage: Arc::new(storage),
        }
    }

    /// Build from adapters the caller keeps a handle to (e.g. to inspect in tests).
    pub fn from_shared(time: Arc<dyn TimeProvider>, storage: Arc<dyn StorageProvider>) -> Self {
        Self { time, storage }
    }

    pub fn now_millis(&self) -> u64 {
        self.time.now_millis()
    }

    pub fn storage_save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.save(key, value)
    }

    pub fn storage_load(&self, key: &str) -> Option<String> {
        self.storage.load(key)
    }

    pub fn storage_remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove(key)
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
