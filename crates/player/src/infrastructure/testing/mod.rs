//! Test support shared by unit tests across the crate.

pub mod fixtures;

pub use fixtures::{memory_platform, memory_platform_with, ManualClock, FIXED_NOW_MILLIS};
