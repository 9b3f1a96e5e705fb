//! User interface
//!
//! View models consumed by the storefront front ends and the CLI.

pub mod presentation;

pub use presentation::{DynamicGameOptions, FieldView, PreviewSession};
