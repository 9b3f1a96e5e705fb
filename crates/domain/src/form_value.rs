//! Values held by a dynamic game form.
//!
//! A form is a flat map from field key to value. Values stay in the loose shape
//! the form produced them in (text, a list of checked options, or a number) and
//! are coerced only when a rule needs a string or a number.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single form value.
///
/// Untagged so a [`FormValueMap`] serializes as a plain JSON object
/// (`{"game_uid": "123456789", "servers": ["A"], "level": 30}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
}

/// Current values of a form, keyed by field key. An absent key means unset.
pub type FormValueMap = BTreeMap<String, FormValue>;

impl FormValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `''` and `[]` are empty. Numbers never are, including `0`.
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Text(value) => value.is_empty(),
            FormValue::List(values) => values.is_empty(),
            FormValue::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FormValue::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Textual form used by length and pattern rules.
    pub fn to_text(&self) -> String {
        match self {
            FormValue::Text(value) => value.clone(),
            FormValue::List(values) => values.join(","),
            FormValue::Number(value) => format_number(*value),
        }
    }

    /// Numeric form used by range rules; `NaN` when the value is not a number.
    pub fn to_number(&self) -> f64 {
        match self {
            FormValue::Number(value) => *value,
            FormValue::Text(value) => parse_number(value),
            FormValue::List(values) => match values.as_slice() {
                [] => 0.0,
                [single] => parse_number(single),
                _ => f64::NAN,
            },
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// Whether a key is unset or holds an empty value.
pub fn is_blank(value: Option<&FormValue>) -> bool {
    value.map_or(true, FormValue::is_empty)
}

/// Prints integral numbers without a fractional part (`60`, not `60.0`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
