//! Platform abstraction ports
//!
//! These traits isolate wall-clock time and durable key-value storage so the
//! draft layer and the form orchestration stay testable.
//!
//! NOTE: The `Platform` struct (DI container) that aggregates these traits
//! lives in `state/platform.rs`, not here.

use thiserror::Error;

/// Time operations abstraction
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> u64;
}

/// Failure of a storage write or delete.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage quota exceeded writing '{key}' ({needed} of {limit} bytes)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("Failed to serialize storage contents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Persistent key-value storage (localStorage equivalent)
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage key conventions
pub mod storage_keys {
    /// Prefix of every draft entry
    pub const DRAFT_PREFIX: &str = "draft_";

    pub fn draft(key: &str) -> String {
        format!("{DRAFT_PREFIX}{key}")
    }
}
