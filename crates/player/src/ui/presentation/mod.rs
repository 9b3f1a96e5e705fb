//! Presentation layer
//!
//! Front-end agnostic view models of the top-up form.

pub mod dynamic_options;
pub mod template_preview;

pub use dynamic_options::{
    handle_event, toggle_option, ChoiceView, DynamicGameOptions, FieldControl, FieldEvent,
    FieldView,
};
pub use template_preview::PreviewSession;
