//! Test doubles for the platform ports.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::infrastructure::platform::MemoryStorageProvider;
use crate::ports::outbound::TimeProvider;
use crate::state::Platform;

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: u64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 2025-01-01T00:00:00Z
pub const FIXED_NOW_MILLIS: u64 = 1_735_689_600_000;

/// A platform over a manual clock and in-memory storage, with handles to both.
pub fn memory_platform() -> (Platform, Arc<ManualClock>, Arc<MemoryStorageProvider>) {
    memory_platform_with(MemoryStorageProvider::new())
}

pub fn memory_platform_with(
    storage: MemoryStorageProvider,
) -> (Platform, Arc<ManualClock>, Arc<MemoryStorageProvider>) {
    let clock = Arc::new(ManualClock::new(FIXED_NOW_MILLIS));
    let storage = Arc::new(storage);
    let platform = Platform::from_shared(clock.clone(), storage.clone());
    (platform, clock, storage)
}
