//! Topup Shared - types shared between storefront clients and the order API
//!
//! - The game catalog (form schemas, games, packages, payment methods)
//! - Order wire payloads
//!
//! No I/O beyond reading a catalog document from disk.

pub mod catalog;
pub mod orders;

pub use catalog::{CatalogDocument, CatalogError, GameCatalog, DEFAULT_CONFIG_GAME_ID};
pub use orders::{ApiErrorBody, CreateOrderRequest, CreateOrderResponse};
