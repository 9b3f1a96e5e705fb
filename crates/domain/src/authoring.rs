//! Editing model for field definitions in the admin console.
//!
//! [`FieldAuthoringForm`] is a loose, editable copy of a [`FieldDefinition`].
//! It is checked with [`FieldAuthoringForm::validate`] and only turns into a
//! definition once it passes.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::game_config::{FieldDefinition, FieldType, NewField, ValidationRules};

static FIELD_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Validation rule inputs as typed by the author; blanks are `None`/empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleInputs {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: String,
}

impl RuleInputs {
    fn from_rules(rules: Option<&ValidationRules>) -> Self {
        rules.map_or_else(Self::default, |rules| Self {
            min: rules.min,
            max: rules.max,
            min_length: rules.min_length,
            max_length: rules.max_length,
            pattern: rules.pattern.clone().unwrap_or_default(),
        })
    }

    /// Drops blank inputs; `None` when nothing is left.
    fn clean(&self) -> Option<ValidationRules> {
        let pattern = self.pattern.trim();
        let rules = ValidationRules {
            min: self.min,
            max: self.max,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: (!pattern.is_empty()).then(|| pattern.to_string()),
        };
        (!rules.is_empty()).then_some(rules)
    }
}

/// Errors found in an authoring form, keyed by the input they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("field definition has {} invalid input(s)", .0.len())]
pub struct AuthoringErrors(pub BTreeMap<String, String>);

impl AuthoringErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, message: impl Into<String>) {
        self.0.insert(key.to_string(), message.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAuthoringForm {
    pub field_type: FieldType,
    pub field_key: String,
    pub field_label: String,
    pub field_options: Vec<String>,
    pub placeholder: String,
    pub display_order: i32,
    pub is_required: bool,
    pub validation: RuleInputs,
}

impl Default for FieldAuthoringForm {
    fn default() -> Self {
        Self {
            field_type: FieldType::Text,
            field_key: String::new(),
            field_label: String::new(),
            field_options: Vec::new(),
            placeholder: String::new(),
            display_order: 1,
            is_required: false,
            validation: RuleInputs::default(),
        }
    }
}

impl FieldAuthoringForm {
    /// Prefills the form for editing an existing field.
    pub fn from_field(field: &FieldDefinition) -> Self {
        Self {
            field_type: field.field_type,
            field_key: field.key.clone(),
            field_label: field.label.clone(),
            field_options: field.options.clone(),
            placeholder: field.placeholder.clone().unwrap_or_default(),
            display_order: field.display_order,
            is_required: field.required,
            validation: RuleInputs::from_rules(field.validation.as_ref()),
        }
    }

    /// Appends a trimmed option. Blank input is ignored.
    pub fn add_option(&mut self, raw: &str) -> bool {
        let option = raw.trim();
        if option.is_empty() {
            return false;
        }
        self.field_options.push(option.to_string());
        true
    }

    pub fn remove_option(&mut self, index: usize) -> Option<String> {
        (index < self.field_options.len()).then(|| self.field_options.remove(index))
    }

    pub fn validate(&self) -> AuthoringErrors {
        let mut errors = AuthoringErrors::default();

        if self.field_key.trim().is_empty() {
            errors.insert("field_key", "欄位名稱為必填");
        } else if !FIELD_KEY_RE.is_match(&self.field_key) {
            errors.insert(
                "field_key",
                "欄位名稱只能包含英文字母、數字和底線，且必須以字母或底線開頭",
            );
        }

        if self.field_label.trim().is_empty() {
            errors.insert("field_label", "顯示標籤為必填");
        }

        if self.display_order < 1 {
            errors.insert("display_order", "顯示順序必須大於 0");
        }

        if self.field_type.needs_options() && self.field_options.is_empty() {
            errors.insert(
                "field_options",
                format!("{}必須至少有一個選項", self.field_type.display_name()),
            );
        }

        if let (Some(min), Some(max)) = (self.validation.min, self.validation.max) {
            if min >= max {
                errors.insert("validation_range", "最小值必須小於最大值");
            }
        }

        if let (Some(min), Some(max)) = (self.validation.min_length, self.validation.max_length) {
            if min >= max {
                errors.insert("validation_length", "最小長度必須小於最大長度");
            }
        }

        errors
    }

    /// A new definition ready to be added to a game config.
    pub fn into_new_field(self) -> Result<NewField, AuthoringErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let validation = self.validation.clean();
        Ok(NewField {
            field_type: self.field_type,
            key: self.field_key,
            label: self.field_label,
            options: self.field_options,
            placeholder: (!self.placeholder.is_empty()).then_some(self.placeholder),
            display_order: self.display_order,
            required: self.is_required,
            validation,
        })
    }

    /// The edited version of `existing`, keeping its id and owner.
    pub fn apply_to(self, existing: &FieldDefinition) -> Result<FieldDefinition, AuthoringErrors> {
        let new_field = self.into_new_field()?;
        Ok(new_field.into_field(existing.id, existing.game_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::GameId;

    fn valid_form() -> FieldAuthoringForm {
        FieldAuthoringForm {
            field_key: "game_uid".into(),
            field_label: "遊戲 UID".into(),
            ..FieldAuthoringForm::default()
        }
    }

    #[test]
    fn options_are_trimmed_and_blanks_ignored() {
        let mut form = valid_form();
        assert!(form.add_option("  亞洲伺服器 "));
        assert!(!form.add_option("   "));
        assert!(form.add_option("美洲伺服器"));
        assert_eq!(form.field_options, vec!["亞洲伺服器", "美洲伺服器"]);

        assert_eq!(form.remove_option(0).as_deref(), Some("亞洲伺服器"));
        assert_eq!(form.remove_option(5), None);
        assert_eq!(form.field_options, vec!["美洲伺服器"]);
    }

    #[test]
    fn key_and_label_checks() {
        let form = FieldAuthoringForm::default();
        let errors = form.validate();
        assert_eq!(errors.get("field_key"), Some("欄位名稱為必填"));
        assert_eq!(errors.get("field_label"), Some("顯示標籤為必填"));

        let form = FieldAuthoringForm {
            field_key: "1uid".into(),
            ..valid_form()
        };
        assert_eq!(
            form.validate().get("field_key"),
            Some("欄位名稱只能包含英文字母、數字和底線，且必須以字母或底線開頭")
        );
        assert!(valid_form().validate().is_empty());
    }

    #[test]
    fn option_types_need_options() {
        let form = FieldAuthoringForm {
            field_type: FieldType::Radio,
            ..valid_form()
        };
        assert_eq!(
            form.validate().get("field_options"),
            Some("單選按鈕必須至少有一個選項")
        );
    }

    #[test]
    fn rule_bounds_and_order() {
        let form = FieldAuthoringForm {
            display_order: 0,
            validation: RuleInputs {
                min: Some(10.0),
                max: Some(10.0),
                min_length: Some(5),
                max_length: Some(3),
                pattern: String::new(),
            },
            ..valid_form()
        };
        let errors = form.validate();
        assert_eq!(errors.get("display_order"), Some("顯示順序必須大於 0"));
        assert_eq!(errors.get("validation_range"), Some("最小值必須小於最大值"));
        assert_eq!(errors.get("validation_length"), Some("最小長度必須小於最大長度"));
        assert!(form.into_new_field().is_err());
    }

    #[test]
    fn empty_rules_become_none() {
        let form = FieldAuthoringForm {
            validation: RuleInputs {
                pattern: "  ".into(),
                ..RuleInputs::default()
            },
            ..valid_form()
        };
        let field = form.into_new_field().unwrap();
        assert_eq!(field.validation, None);
        assert_eq!(field.placeholder, None);
    }

    #[test]
    fn partial_rules_are_kept() {
        let form = FieldAuthoringForm {
            validation: RuleInputs {
                min_length: Some(9),
                pattern: "^[0-9]{9}$".into(),
                ..RuleInputs::default()
            },
            ..valid_form()
        };
        let rules = form.into_new_field().unwrap().validation.unwrap();
        assert_eq!(rules.min_length, Some(9));
        assert_eq!(rules.max_length, None);
        assert_eq!(rules.pattern.as_deref(), Some("^[0-9]{9}$"));
    }

    #[test]
    fn editing_keeps_identity() {
        let existing = FieldDefinition::text(GameId::new(1), "game_uid", "UID").with_order(3);
        let mut form = FieldAuthoringForm::from_field(&existing);
        assert_eq!(form.display_order, 3);
        form.field_label = "遊戲 UID".into();

        let updated = form.apply_to(&existing).unwrap();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.game_id, existing.game_id);
        assert_eq!(updated.label, "遊戲 UID");
    }
}
