//! Platform-specific implementations
//!
//! Implementations of the platform ports defined in
//! ports/outbound/platform.rs.

mod desktop;
mod memory;

pub use desktop::{create_platform, DesktopStorageProvider, SystemTimeProvider};
pub use memory::MemoryStorageProvider;
