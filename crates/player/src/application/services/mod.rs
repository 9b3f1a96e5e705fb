//! Application services
//!
//! Services depend on port traits, not concrete infrastructure
//! implementations.

pub mod topup_form;

pub use topup_form::{FormStatus, SubmitOutcome, TopupForm, TopupFormOptions};
