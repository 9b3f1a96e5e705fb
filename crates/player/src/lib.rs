//! Storefront client.
//!
//! Runs a game's top-up form on top of the domain rules: inline validation,
//! debounced local drafts, package and payment selection, and order submission
//! through the order API. The presentation layer exposes front-end agnostic
//! view models; the `topup-player` binary drives everything from the command
//! line.

pub mod application;
pub mod cli;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod state;
pub mod ui;

pub use application::services::{FormStatus, SubmitOutcome, TopupForm, TopupFormOptions};
pub use application::TopupError;
pub use config::{ConfigError, PlayerConfig};
pub use state::Platform;
