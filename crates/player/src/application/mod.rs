//! Application layer: draft persistence and the top-up form use case.

pub mod draft;
pub mod error;
pub mod services;

pub use draft::{DraftInfo, DraftOptions, DraftPhase, DraftSaver};
pub use error::TopupError;
