//! Infrastructure adapters for the outbound ports.

pub mod catalog;
pub mod http;
pub mod platform;
pub mod testing;

pub use http::HttpOrderGateway;
pub use platform::create_platform;
