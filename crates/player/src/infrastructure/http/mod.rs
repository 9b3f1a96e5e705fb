//! HTTP adapters

mod order_client;

pub use order_client::{HttpOrderGateway, DEFAULT_API_BASE_URL};
