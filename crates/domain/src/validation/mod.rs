//! Form validation engine.
//!
//! Pure functions over a field schema and the current form values. Verdicts are
//! returned as values; nothing here fails or performs I/O. A field reports at
//! most one error: the first failing check in the order required, min length,
//! max length, pattern (text) or number, min, max (number).
//!
//! Two modes exist. `Strict` enforces `required` and is used on submission.
//! `Realtime` skips `required` so a field is not flagged while the customer is
//! still filling the form in.

mod conditional;
pub mod special;

pub use conditional::{validate_async, validate_conditional, Condition};

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::form_value::{format_number, FormValue, FormValueMap};
use crate::game_config::{FieldDefinition, FieldType, ValidationRules};

// =============================================================================
// Result Types
// =============================================================================

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationErrorKind {
    Required,
    Format,
    Length,
    Range,
    Custom,
}

/// A failed check on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Key of the offending field
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    fn new(field: &FieldDefinition, kind: ValidationErrorKind, message: String) -> Self {
        Self {
            field: field.key.clone(),
            message,
            kind,
        }
    }
}

/// Outcome of validating a whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    /// Field key -> message of the last error recorded for that key
    pub field_errors: BTreeMap<String, String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            field_errors: BTreeMap::new(),
        }
    }
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        let field_errors = errors
            .iter()
            .map(|error| (error.field.clone(), error.message.clone()))
            .collect();
        Self {
            is_valid: errors.is_empty(),
            errors,
            field_errors,
        }
    }

    fn push(&mut self, error: ValidationError) {
        self.field_errors
            .insert(error.field.clone(), error.message.clone());
        self.errors.push(error);
        self.is_valid = false;
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }
}

// =============================================================================
// Options
// =============================================================================

/// Whether `required` is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Submission: empty required fields fail
    #[default]
    Strict,
    /// While typing: empty required fields pass
    Realtime,
}

/// Replacement messages for individual checks of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageOverrides {
    #[serde(default)]
    pub required: Option<String>,
    #[serde(default)]
    pub min_length: Option<String>,
    #[serde(default)]
    pub max_length: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Value is not a number
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub min: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
}

fn pick(message: Option<&Option<String>>, default: impl FnOnce() -> String) -> String {
    message.and_then(|m| m.clone()).unwrap_or_else(default)
}

// =============================================================================
// Single Field
// =============================================================================

/// Validates one value against one field definition.
pub fn validate_field(
    field: &FieldDefinition,
    value: Option<&FormValue>,
    mode: ValidationMode,
) -> Option<ValidationError> {
    validate_field_with_messages(field, value, mode, None)
}

/// [`validate_field`] with per-check message overrides.
pub fn validate_field_with_messages(
    field: &FieldDefinition,
    value: Option<&FormValue>,
    mode: ValidationMode,
    messages: Option<&MessageOverrides>,
) -> Option<ValidationError> {
    let label = field.label.as_str();

    if mode == ValidationMode::Strict && field.required {
        let required = messages.map(|m| &m.required);
        match value {
            None => {
                return Some(ValidationError::new(
                    field,
                    ValidationErrorKind::Required,
                    pick(required, || format!("{label}為必填項目")),
                ));
            }
            Some(FormValue::Text(text)) if text.is_empty() => {
                return Some(ValidationError::new(
                    field,
                    ValidationErrorKind::Required,
                    pick(required, || format!("{label}為必填項目")),
                ));
            }
            Some(FormValue::List(items)) if items.is_empty() => {
                return Some(ValidationError::new(
                    field,
                    ValidationErrorKind::Required,
                    pick(required, || format!("{label}至少需要選擇一個選項")),
                ));
            }
            Some(_) => {}
        }
    }

    // Absence is never a format, length or range error.
    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ => return None,
    };
    let rules = field.validation.as_ref()?;

    match field.field_type {
        FieldType::Text => check_text(field, rules, value, messages),
        FieldType::Number => check_number(field, rules, value, messages),
        FieldType::Select | FieldType::Radio | FieldType::Checkbox | FieldType::Unknown => None,
    }
}

fn check_text(
    field: &FieldDefinition,
    rules: &ValidationRules,
    value: &FormValue,
    messages: Option<&MessageOverrides>,
) -> Option<ValidationError> {
    let label = field.label.as_str();
    let text = value.to_text();
    let length = text.chars().count();

    if let Some(min_length) = rules.min_length {
        if length < min_length {
            return Some(ValidationError::new(
                field,
                ValidationErrorKind::Length,
                pick(messages.map(|m| &m.min_length), || {
                    format!("{label}至少需要 {min_length} 個字符")
                }),
            ));
        }
    }

    if let Some(max_length) = rules.max_length {
        if length > max_length {
            return Some(ValidationError::new(
                field,
                ValidationErrorKind::Length,
                pick(messages.map(|m| &m.max_length), || {
                    format!("{label}不能超過 {max_length} 個字符")
                }),
            ));
        }
    }

    let pattern = rules.pattern.as_deref().filter(|p| !p.is_empty())?;
    match Regex::new(pattern) {
        Ok(regex) if regex.is_match(&text) => None,
        Ok(_) => Some(ValidationError::new(
            field,
            ValidationErrorKind::Format,
            pick(messages.map(|m| &m.pattern), || format!("{label}格式不正確")),
        )),
        Err(error) => {
            tracing::error!(
                field_key = %field.key,
                pattern = %pattern,
                error = %error,
                "Invalid validation pattern"
            );
            Some(ValidationError::new(
                field,
                ValidationErrorKind::Custom,
                format!("{label}驗證規則設定錯誤"),
            ))
        }
    }
}

fn check_number(
    field: &FieldDefinition,
    rules: &ValidationRules,
    value: &FormValue,
    messages: Option<&MessageOverrides>,
) -> Option<ValidationError> {
    let label = field.label.as_str();
    let number = value.to_number();

    if number.is_nan() {
        return Some(ValidationError::new(
            field,
            ValidationErrorKind::Format,
            pick(messages.map(|m| &m.number), || {
                format!("{label}必須是有效的數字")
            }),
        ));
    }

    if let Some(min) = rules.min {
        if number < min {
            return Some(ValidationError::new(
                field,
                ValidationErrorKind::Range,
                pick(messages.map(|m| &m.min), || {
                    format!("{label}不能小於 {}", format_number(min))
                }),
            ));
        }
    }

    if let Some(max) = rules.max {
        if number > max {
            return Some(ValidationError::new(
                field,
                ValidationErrorKind::Range,
                pick(messages.map(|m| &m.max), || {
                    format!("{label}不能大於 {}", format_number(max))
                }),
            ));
        }
    }

    None
}

/// Live feedback while typing: never flags an empty required field.
pub fn validate_field_realtime(field: &FieldDefinition, value: Option<&FormValue>) -> Option<String> {
    validate_field(field, value, ValidationMode::Realtime).map(|error| error.message)
}

// =============================================================================
// Whole Form
// =============================================================================

/// Strict validation of every field.
pub fn validate_form<'a, I>(fields: I, values: &FormValueMap) -> ValidationResult
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    validate_form_with_messages(fields, values, &HashMap::new())
}

/// [`validate_form`] with message overrides keyed by field key.
pub fn validate_form_with_messages<'a, I>(
    fields: I,
    values: &FormValueMap,
    messages: &HashMap<String, MessageOverrides>,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    let errors = fields
        .into_iter()
        .filter_map(|field| {
            validate_field_with_messages(
                field,
                values.get(&field.key),
                ValidationMode::Strict,
                messages.get(&field.key),
            )
        })
        .collect();
    ValidationResult::from_errors(errors)
}

/// Cross-field check run on submission: `(value, all values) -> message`.
pub type FieldValidatorFn = dyn Fn(Option<&FormValue>, &FormValueMap) -> Option<String> + Send + Sync;

/// Extra checks layered on top of the schema, run in insertion order.
#[derive(Default)]
pub struct SubmissionValidators {
    validators: Vec<(String, Box<FieldValidatorFn>)>,
}

impl SubmissionValidators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, key: impl Into<String>, validator: F) -> Self
    where
        F: Fn(Option<&FormValue>, &FormValueMap) -> Option<String> + Send + Sync + 'static,
    {
        self.add(key, validator);
        self
    }

    pub fn add<F>(&mut self, key: impl Into<String>, validator: F)
    where
        F: Fn(Option<&FormValue>, &FormValueMap) -> Option<String> + Send + Sync + 'static,
    {
        self.validators.push((key.into(), Box::new(validator)));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for SubmissionValidators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|(key, _)| key))
            .finish()
    }
}

/// Final check before an order is sent: the schema in strict mode, then the
/// extra validators. Their failures are reported with kind `Custom`.
pub fn validate_for_submission<'a, I>(
    fields: I,
    values: &FormValueMap,
    extra: &SubmissionValidators,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    let mut result = validate_form(fields, values);

    for (key, validator) in &extra.validators {
        if let Some(message) = validator(values.get(key), values) {
            result.push(ValidationError {
                field: key.clone(),
                message,
                kind: ValidationErrorKind::Custom,
            });
        }
    }

    result.is_valid = result.errors.is_empty();
    result
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_value::is_blank;
    use crate::ids::GameId;

    fn uid_field() -> FieldDefinition {
        FieldDefinition::text(GameId::new(1), "uid", "遊戲 UID")
            .required()
            .with_validation(ValidationRules::length(9, 9).with_pattern("^[0-9]{9}$"))
    }

    fn level_field() -> FieldDefinition {
        FieldDefinition::new(GameId::new(1), FieldType::Number, "level", "冒險等級")
            .with_validation(ValidationRules::range(1.0, 60.0))
    }

    fn text(value: &str) -> FormValue {
        FormValue::text(value)
    }

    fn strict(field: &FieldDefinition, value: Option<&FormValue>) -> Option<ValidationError> {
        validate_field(field, value, ValidationMode::Strict)
    }

    #[test]
    fn required_fails_only_in_strict_mode() {
        let field = uid_field();
        for empty in [None, Some(text(""))] {
            let error = strict(&field, empty.as_ref()).unwrap();
            assert_eq!(error.kind, ValidationErrorKind::Required);
            assert_eq!(error.message, "遊戲 UID為必填項目");
            assert_eq!(validate_field_realtime(&field, empty.as_ref()), None);
        }
    }

    #[test]
    fn required_list_has_its_own_message() {
        let field = FieldDefinition::new(GameId::new(1), FieldType::Checkbox, "items", "道具")
            .with_options(["A", "B"])
            .required();
        let error = strict(&field, Some(&FormValue::List(vec![]))).unwrap();
        assert_eq!(error.kind, ValidationErrorKind::Required);
        assert_eq!(error.message, "道具至少需要選擇一個選項");
        assert!(strict(&field, Some(&FormValue::List(vec!["A".into()]))).is_none());
    }

    #[test]
    fn empty_optional_value_skips_rules() {
        let mut field = uid_field();
        field.required = false;
        assert!(strict(&field, None).is_none());
        assert!(strict(&field, Some(&text(""))).is_none());
    }

    #[test]
    fn text_rules_report_first_violation() {
        let field = uid_field();
        assert!(strict(&field, Some(&text("123456789"))).is_none());

        let short = strict(&field, Some(&text("12345678"))).unwrap();
        assert_eq!(short.kind, ValidationErrorKind::Length);
        assert_eq!(short.message, "遊戲 UID至少需要 9 個字符");

        let long = strict(&field, Some(&text("1234567890"))).unwrap();
        assert_eq!(long.kind, ValidationErrorKind::Length);
        assert_eq!(long.message, "遊戲 UID不能超過 9 個字符");

        let bad = strict(&field, Some(&text("12345678a"))).unwrap();
        assert_eq!(bad.kind, ValidationErrorKind::Format);
        assert_eq!(bad.message, "遊戲 UID格式不正確");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let field = FieldDefinition::text(GameId::new(1), "name", "角色暱稱")
            .with_validation(ValidationRules::length(1, 4));
        assert!(strict(&field, Some(&text("旅行者"))).is_none());
        assert!(strict(&field, Some(&text("璃月旅行者"))).is_some());
    }

    #[test]
    fn malformed_pattern_degrades_to_custom_error() {
        let field = FieldDefinition::text(GameId::new(1), "code", "兌換碼")
            .with_validation(ValidationRules::default().with_pattern("([0-9"));
        let error = strict(&field, Some(&text("123"))).unwrap();
        assert_eq!(error.kind, ValidationErrorKind::Custom);
        assert_eq!(error.message, "兌換碼驗證規則設定錯誤");
    }

    #[test]
    fn number_range_checks() {
        let field = level_field();

        let low = strict(&field, Some(&FormValue::Number(0.0))).unwrap();
        assert_eq!(low.kind, ValidationErrorKind::Range);
        assert_eq!(low.message, "冒險等級不能小於 1");

        let high = strict(&field, Some(&FormValue::Number(61.0))).unwrap();
        assert_eq!(high.kind, ValidationErrorKind::Range);
        assert_eq!(high.message, "冒險等級不能大於 60");

        assert!(strict(&field, Some(&FormValue::Number(30.0))).is_none());
        assert!(strict(&field, Some(&text("30"))).is_none());
    }

    #[test]
    fn non_numeric_value_is_a_format_error() {
        let error = strict(&level_field(), Some(&text("abc"))).unwrap();
        assert_eq!(error.kind, ValidationErrorKind::Format);
        assert_eq!(error.message, "冒險等級必須是有效的數字");
    }

    #[test]
    fn choice_fields_only_check_required() {
        let field = FieldDefinition::new(GameId::new(1), FieldType::Select, "server", "伺服器")
            .with_options(["亞洲伺服器"])
            .with_validation(ValidationRules::length(50, 60));
        assert!(strict(&field, Some(&text("anything"))).is_none());
    }

    #[test]
    fn message_overrides_replace_defaults() {
        let field = uid_field();
        let overrides = MessageOverrides {
            required: Some("請填寫 UID".into()),
            pattern: Some("UID 只能是數字".into()),
            ..MessageOverrides::default()
        };
        let missing =
            validate_field_with_messages(&field, None, ValidationMode::Strict, Some(&overrides))
                .unwrap();
        assert_eq!(missing.message, "請填寫 UID");

        let bad = validate_field_with_messages(
            &field,
            Some(&text("12345678a")),
            ValidationMode::Strict,
            Some(&overrides),
        )
        .unwrap();
        assert_eq!(bad.message, "UID 只能是數字");

        let short = validate_field_with_messages(
            &field,
            Some(&text("1")),
            ValidationMode::Strict,
            Some(&overrides),
        )
        .unwrap();
        assert_eq!(short.message, "遊戲 UID至少需要 9 個字符");
    }

    #[test]
    fn form_aggregates_one_error_per_field() {
        let fields = vec![uid_field(), level_field()];
        let mut values = FormValueMap::new();
        values.insert("level".into(), FormValue::Number(99.0));

        let result = validate_form(&fields, &values);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.error_for("uid"), Some("遊戲 UID為必填項目"));
        assert_eq!(result.error_for("level"), Some("冒險等級不能大於 60"));
    }

    #[test]
    fn submission_end_to_end() {
        let fields = vec![uid_field()];
        let empty = FormValueMap::new();
        let result = validate_for_submission(&fields, &empty, &SubmissionValidators::new());
        assert!(!result.is_valid);
        assert_eq!(
            result.field_errors,
            BTreeMap::from([("uid".to_string(), "遊戲 UID為必填項目".to_string())])
        );

        let mut values = FormValueMap::new();
        values.insert("uid".into(), text("123456789"));
        let result = validate_for_submission(&fields, &values, &SubmissionValidators::new());
        assert!(result.is_valid);
        assert!(result.field_errors.is_empty());
    }

    #[test]
    fn extra_validators_are_merged() {
        let fields = vec![uid_field()];
        let mut values = FormValueMap::new();
        values.insert("uid".into(), text("123456789"));

        let extra = SubmissionValidators::new()
            .with("package", |value, _| {
                is_blank(value).then(|| "請選擇儲值套餐".to_string())
            })
            .with("uid", |value, all| {
                let confirm = all.get("uid_confirm");
                (value != confirm).then(|| "兩次輸入的 UID 不一致".to_string())
            });

        let result = validate_for_submission(&fields, &values, &extra);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::Custom));
        assert_eq!(result.error_for("package"), Some("請選擇儲值套餐"));
        assert_eq!(result.error_for("uid"), Some("兩次輸入的 UID 不一致"));
    }

    #[test]
    fn result_serializes_like_the_client_contract() {
        let result = validate_form(&[uid_field()], &FormValueMap::new());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0]["type"], "required");
        assert_eq!(json["fieldErrors"]["uid"], "遊戲 UID為必填項目");
    }
}
