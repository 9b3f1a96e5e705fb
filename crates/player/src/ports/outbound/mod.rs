//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to work without depending on concrete
//! implementations.

pub mod catalog_port;
pub mod order_port;
pub mod platform;

pub use catalog_port::GameCatalogPort;
pub use order_port::{OrderSubmissionPort, OrderSubmitError};
pub use platform::{storage_keys, StorageError, StorageProvider, TimeProvider};

#[cfg(test)]
pub use catalog_port::MockGameCatalogPort;
#[cfg(test)]
pub use order_port::MockOrderSubmissionPort;
