//! Per-game form schema.
//!
//! Each game owns an ordered set of field definitions describing the account
//! details a customer must supply with a top-up order (UID, server, nickname...).
//! The storefront renders the form from this schema and validates against it
//! without any game-specific code.
//!
//! Serialized field names follow the stored `game_options` records
//! (`field_key`, `field_label`, `is_required`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{FieldId, GameId};

// =============================================================================
// Field Types
// =============================================================================

/// Type of a field; selects both its validation rules and its input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text input
    Text,
    /// Numeric input
    Number,
    /// Drop-down, single choice
    Select,
    /// Radio group, single choice
    Radio,
    /// Checkbox group, any number of choices
    Checkbox,
    /// Unknown for forward compatibility
    #[serde(other)]
    Unknown,
}

impl FieldType {
    /// All types an author can pick from.
    pub const ALL: [FieldType; 5] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
    ];

    /// Whether the field draws its values from an option list.
    pub fn needs_options(self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radio | FieldType::Checkbox
        )
    }

    /// Name shown in the admin console.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldType::Text => "文字輸入",
            FieldType::Number => "數字輸入",
            FieldType::Select => "下拉選單",
            FieldType::Radio => "單選按鈕",
            FieldType::Checkbox => "複選框",
            FieldType::Unknown => "未知類型",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "select" => Ok(FieldType::Select),
            "radio" => Ok(FieldType::Radio),
            "checkbox" => Ok(FieldType::Checkbox),
            other => Err(DomainError::parse(format!("Unknown field type: {}", other))),
        }
    }
}

// =============================================================================
// Validation Rules
// =============================================================================

/// Optional value rules for a field.
///
/// `min`/`max` apply to number fields, `min_length`/`max_length`/`pattern` to
/// text fields. Rules that do not apply to the field's type are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression, searched (not anchored) in the text value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.as_deref().map_or(true, str::is_empty)
    }

    pub fn length(min: usize, max: usize) -> Self {
        Self {
            min_length: Some(min),
            max_length: Some(max),
            ..Self::default()
        }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

// =============================================================================
// Field Definitions
// =============================================================================

/// Definition of a single configurable form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Assigned at creation, never changes
    pub id: FieldId,
    /// Owning game
    pub game_id: GameId,
    pub field_type: FieldType,
    /// Machine name, unique within the game; key into the form values
    #[serde(rename = "field_key")]
    pub key: String,
    /// Display label
    #[serde(rename = "field_label")]
    pub label: String,
    /// Choices for select/radio/checkbox fields
    #[serde(rename = "field_options", default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Lower sorts first; ties keep their stored order
    pub display_order: i32,
    #[serde(rename = "is_required", default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
}

/// A field definition that has not been assigned an id or owner yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewField {
    pub field_type: FieldType,
    #[serde(rename = "field_key")]
    pub key: String,
    #[serde(rename = "field_label")]
    pub label: String,
    #[serde(rename = "field_options", default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    pub display_order: i32,
    #[serde(rename = "is_required", default)]
    pub required: bool,
    #[serde(default)]
    pub validation: Option<ValidationRules>,
}

impl NewField {
    pub fn into_field(self, id: FieldId, game_id: GameId) -> FieldDefinition {
        FieldDefinition {
            id,
            game_id,
            field_type: self.field_type,
            key: self.key,
            label: self.label,
            options: self.options,
            placeholder: self.placeholder,
            display_order: self.display_order,
            required: self.required,
            validation: self.validation,
        }
    }
}

impl FieldDefinition {
    /// Minimal text field, mostly useful for building schemas in code.
    pub fn text(game_id: GameId, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(game_id, FieldType::Text, key, label)
    }

    pub fn new(
        game_id: GameId,
        field_type: FieldType,
        key: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: FieldId::new(),
            game_id,
            field_type,
            key: key.into(),
            label: label.into(),
            options: Vec::new(),
            placeholder: None,
            display_order: 1,
            required: false,
            validation: None,
        }
    }

    pub fn with_id(mut self, id: FieldId) -> Self {
        self.id = id;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }
}

/// Sorts ascending by `display_order`; equal orders keep their relative order.
pub fn sort_fields<'a, I>(fields: I) -> Vec<&'a FieldDefinition>
where
    I: IntoIterator<Item = &'a FieldDefinition>,
{
    let mut sorted: Vec<&FieldDefinition> = fields.into_iter().collect();
    sorted.sort_by_key(|field| field.display_order);
    sorted
}

// =============================================================================
// Game Config
// =============================================================================

/// All configurable fields of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub game_id: GameId,
    pub fields: Vec<FieldDefinition>,
}

impl GameConfig {
    pub fn new(game_id: GameId, fields: Vec<FieldDefinition>) -> Self {
        Self { game_id, fields }
    }

    /// Fields in presentation order.
    pub fn sorted_fields(&self) -> Vec<&FieldDefinition> {
        sort_fields(&self.fields)
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Copy of this config owned by another game (used for the fallback schema).
    pub fn for_game(&self, game_id: GameId) -> Self {
        Self {
            game_id,
            fields: self
                .fields
                .iter()
                .cloned()
                .map(|mut field| {
                    field.game_id = game_id;
                    field
                })
                .collect(),
        }
    }

    /// Adds a field with a fresh id, owned by this game. Field keys name form
    /// values, so a key already in use is rejected.
    pub fn add_field(&mut self, new_field: NewField) -> Result<&FieldDefinition, DomainError> {
        self.ensure_key_free(&new_field.key, None)?;
        let id = FieldId::new();
        self.fields.push(new_field.into_field(id, self.game_id));
        self.resort();
        let index = self
            .fields
            .iter()
            .position(|field| field.id == id)
            .unwrap_or(self.fields.len() - 1);
        Ok(&self.fields[index])
    }

    /// Replaces the field with the same id.
    pub fn update_field(&mut self, updated: FieldDefinition) -> Result<(), DomainError> {
        self.ensure_key_free(&updated.key, Some(updated.id))?;
        let slot = self
            .fields
            .iter_mut()
            .find(|field| field.id == updated.id)
            .ok_or_else(|| DomainError::not_found("FieldDefinition", updated.id.to_string()))?;
        *slot = FieldDefinition {
            game_id: self.game_id,
            ..updated
        };
        self.resort();
        Ok(())
    }

    pub fn remove_field(&mut self, id: FieldId) -> Result<FieldDefinition, DomainError> {
        let index = self
            .fields
            .iter()
            .position(|field| field.id == id)
            .ok_or_else(|| DomainError::not_found("FieldDefinition", id.to_string()))?;
        Ok(self.fields.remove(index))
    }

    fn ensure_key_free(&self, key: &str, except: Option<FieldId>) -> Result<(), DomainError> {
        let taken = self
            .fields
            .iter()
            .any(|field| field.key == key && Some(field.id) != except);
        if taken {
            return Err(DomainError::constraint(format!(
                "field key `{key}` is already used in game {}",
                self.game_id
            )));
        }
        Ok(())
    }

    fn resort(&mut self) {
        self.fields.sort_by_key(|field| field.display_order);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key: &str, order: i32) -> FieldDefinition {
        FieldDefinition::text(GameId::new(1), key, key.to_uppercase()).with_order(order)
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let fields = vec![field("a", 2), field("b", 2), field("c", 1)];
        let keys: Vec<&str> = sort_fields(&fields)
            .into_iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn field_type_serialization() {
        let json = serde_json::to_string(&FieldType::Checkbox).unwrap();
        assert_eq!(json, "\"checkbox\"");

        let parsed: FieldType = serde_json::from_str("\"slider\"").unwrap();
        assert_eq!(parsed, FieldType::Unknown);
    }

    #[test]
    fn field_type_from_str() {
        assert_eq!("Radio".parse::<FieldType>().unwrap(), FieldType::Radio);
        assert!("slider".parse::<FieldType>().is_err());
    }

    #[test]
    fn field_definition_uses_stored_column_names() {
        let field = FieldDefinition::new(GameId::new(1), FieldType::Select, "server", "伺服器")
            .with_options(["亞洲伺服器"])
            .required();
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["field_key"], "server");
        assert_eq!(json["field_label"], "伺服器");
        assert_eq!(json["field_options"][0], "亞洲伺服器");
        assert_eq!(json["is_required"], true);
        assert_eq!(json["field_type"], "select");
    }

    #[test]
    fn rules_use_camel_case() {
        let rules = ValidationRules::length(9, 9).with_pattern("^[0-9]{9}$");
        let json = serde_json::to_value(&rules).unwrap();
        assert_eq!(json["minLength"], 9);
        assert_eq!(json["maxLength"], 9);
        assert!(json.get("min").is_none());
    }

    #[test]
    fn add_update_remove_fields() {
        let mut config = GameConfig::new(GameId::new(7), vec![field("b", 5)]);

        let added_id = config
            .add_field(NewField {
                field_type: FieldType::Number,
                key: "level".into(),
                label: "等級".into(),
                options: vec![],
                placeholder: None,
                display_order: 1,
                required: false,
                validation: Some(ValidationRules::range(1.0, 60.0)),
            })
            .unwrap()
            .id;

        assert_eq!(config.fields[0].id, added_id);
        assert_eq!(config.fields[0].game_id, GameId::new(7));

        let mut moved = config.fields[0].clone();
        moved.display_order = 10;
        config.update_field(moved).unwrap();
        assert_eq!(config.fields[1].id, added_id);

        let removed = config.remove_field(added_id).unwrap();
        assert_eq!(removed.key, "level");
        assert!(matches!(
            config.remove_field(added_id),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn field_keys_stay_unique() {
        let mut config = GameConfig::new(GameId::new(7), vec![field("uid", 1), field("server", 2)]);

        let duplicate = NewField {
            field_type: FieldType::Text,
            key: "uid".into(),
            label: "UID".into(),
            options: vec![],
            placeholder: None,
            display_order: 3,
            required: false,
            validation: None,
        };
        assert!(matches!(
            config.add_field(duplicate),
            Err(DomainError::Constraint(_))
        ));
        assert_eq!(config.fields.len(), 2);

        let mut renamed = config.fields[1].clone();
        renamed.key = "uid".into();
        assert!(matches!(
            config.update_field(renamed.clone()),
            Err(DomainError::Constraint(_))
        ));
        assert_eq!(config.fields[1].key, "server");

        // Keeping its own key is not a clash.
        renamed.key = "server".into();
        renamed.label = "區服".into();
        config.update_field(renamed).unwrap();
        assert_eq!(config.fields[1].label, "區服");
    }

    #[test]
    fn fallback_config_is_restamped() {
        let config = GameConfig::new(GameId::new(0), vec![field("uid", 1)]);
        let copy = config.for_game(GameId::new(99));
        assert_eq!(copy.game_id, GameId::new(99));
        assert!(copy.fields.iter().all(|f| f.game_id == GameId::new(99)));
    }
}
