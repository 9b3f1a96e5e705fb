//! Domain model of the game top-up storefront.
//!
//! Games describe the account details an order needs through a per-game form
//! schema ([`GameConfig`]). This crate holds that schema, the values a customer
//! enters ([`FormValue`]), the validation engine that checks them, and the
//! editing rules the admin console applies when authoring fields.

pub mod authoring;
pub mod error;
pub mod form_value;
pub mod game_config;
pub mod ids;
pub mod storefront;
pub mod validation;

pub use authoring::{AuthoringErrors, FieldAuthoringForm, RuleInputs};
pub use error::DomainError;
pub use form_value::{format_number, is_blank, FormValue, FormValueMap};
pub use game_config::{
    sort_fields, FieldDefinition, FieldType, GameConfig, NewField, ValidationRules,
};
pub use ids::{FieldId, GameId, PackageId, PaymentMethodId};
pub use storefront::{Game, GamePackage, OrderFormData, PaymentMethod};
pub use validation::{
    special, validate_async, validate_conditional, validate_field, validate_field_realtime,
    validate_field_with_messages, validate_for_submission, validate_form,
    validate_form_with_messages, Condition, MessageOverrides, SubmissionValidators,
    ValidationError, ValidationErrorKind, ValidationMode, ValidationResult,
};
