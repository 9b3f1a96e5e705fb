//! Process-local storage for tests and short-lived sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::ports::outbound::{StorageError, StorageProvider};

#[derive(Default)]
pub struct MemoryStorageProvider {
    entries: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
    /// Maximum size of a single value in bytes
    quota: Option<usize>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects values larger than `limit` bytes, like a full localStorage.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Number of successful `save` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes a raw value without counting it as a save.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageProvider for MemoryStorageProvider {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed: value.len(),
                    limit,
                });
            }
        }
        self.entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_successful_writes() {
        let storage = MemoryStorageProvider::new();
        storage.save("a", "1").unwrap();
        storage.save("a", "2").unwrap();
        storage.seed("b", "3");
        assert_eq!(storage.write_count(), 2);
        assert_eq!(storage.load("a").as_deref(), Some("2"));
        assert_eq!(storage.len(), 2);

        storage.remove("a").unwrap();
        assert_eq!(storage.load("a"), None);
    }

    #[test]
    fn quota_rejects_large_values() {
        let storage = MemoryStorageProvider::with_quota(4);
        assert!(storage.save("k", "1234").is_ok());
        assert!(matches!(
            storage.save("k", "12345"),
            Err(StorageError::QuotaExceeded { limit: 4, .. })
        ));
        assert_eq!(storage.load("k").as_deref(), Some("1234"));
        assert_eq!(storage.write_count(), 1);
    }
}
