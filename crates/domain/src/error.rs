//! Unified error types for the domain layer
//!
//! Form validation verdicts are values (`ValidationError`), not errors. This type
//! covers the operations that can genuinely fail: id parsing, config editing and
//! field authoring.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field definition)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for FieldType {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "text" => Ok(Self::Text),
    ///             _ => Err(DomainError::parse(format!("Unknown field type: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("label cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: label cannot be empty");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("FieldDefinition", "genshin_uid");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(err.to_string().contains("FieldDefinition"));
        assert!(err.to_string().contains("genshin_uid"));
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("duplicate field key");
        assert_eq!(err.to_string(), "Constraint violation: duplicate field key");
    }

    #[test]
    fn test_parse_error() {
        let err = DomainError::parse("Unknown field type: slider");
        assert_eq!(err.to_string(), "Parse error: Unknown field type: slider");
    }
}
