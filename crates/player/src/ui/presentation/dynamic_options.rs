//! Dynamic game options
//!
//! Turns a game's field schema, the current values and the current inline
//! errors into one view per field. Each field type maps to one control; the
//! front end draws the control and feeds user input back through
//! [`handle_event`], which produces the `(key, value)` change the form expects.

use std::collections::BTreeMap;

use serde::Serialize;
use topup_domain::{
    format_number, sort_fields, FieldDefinition, FieldId, FieldType, FormValue, FormValueMap,
};

/// One option of a radio or checkbox group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    pub value: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldControl {
    TextInput {
        value: String,
        placeholder: Option<String>,
    },
    NumberInput {
        value: String,
        placeholder: Option<String>,
        min: Option<f64>,
        max: Option<f64>,
    },
    Select {
        value: String,
        /// First, empty entry of the drop-down
        prompt: String,
        options: Vec<String>,
    },
    RadioGroup {
        /// Group name shared by the radio inputs
        name: String,
        options: Vec<ChoiceView>,
    },
    CheckboxGroup {
        options: Vec<ChoiceView>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub id: FieldId,
    pub key: String,
    pub label: String,
    pub required: bool,
    pub control: FieldControl,
    /// Inline error shown beneath the control
    pub error: Option<String>,
}

/// User input on one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    /// New text of an input, or the chosen option of a select or radio group
    Input(String),
    /// A checkbox option was checked or unchecked
    Toggle { option: String, checked: bool },
}

pub struct DynamicGameOptions<'a> {
    fields: &'a [FieldDefinition],
    values: &'a FormValueMap,
    errors: &'a BTreeMap<String, String>,
}

impl<'a> DynamicGameOptions<'a> {
    pub fn new(
        fields: &'a [FieldDefinition],
        values: &'a FormValueMap,
        errors: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            fields,
            values,
            errors,
        }
    }

    /// Views in display order. Fields of an unknown type are left out.
    pub fn render(&self) -> Vec<FieldView> {
        sort_fields(self.fields)
            .into_iter()
            .filter_map(|field| {
                let control = control_for(field, self.values.get(&field.key))?;
                Some(FieldView {
                    id: field.id,
                    key: field.key.clone(),
                    label: field.label.clone(),
                    required: field.required,
                    control,
                    error: self.errors.get(&field.key).cloned(),
                })
            })
            .collect()
    }
}

fn control_for(field: &FieldDefinition, value: Option<&FormValue>) -> Option<FieldControl> {
    let text = || value.map(FormValue::to_text).unwrap_or_default();

    let control = match field.field_type {
        FieldType::Text => FieldControl::TextInput {
            value: text(),
            placeholder: field.placeholder.clone(),
        },
        FieldType::Number => {
            let rules = field.validation.as_ref();
            FieldControl::NumberInput {
                value: match value {
                    Some(FormValue::Number(number)) => format_number(*number),
                    _ => text(),
                },
                placeholder: field.placeholder.clone(),
                min: rules.and_then(|r| r.min),
                max: rules.and_then(|r| r.max),
            }
        }
        FieldType::Select => FieldControl::Select {
            value: text(),
            prompt: format!("請選擇{}", field.label),
            options: field.options.clone(),
        },
        FieldType::Radio => {
            let current = text();
            FieldControl::RadioGroup {
                name: field.key.clone(),
                options: field
                    .options
                    .iter()
                    .map(|option| ChoiceView {
                        value: option.clone(),
                        checked: *option == current,
                    })
                    .collect(),
            }
        }
        FieldType::Checkbox => {
            let checked = value.and_then(FormValue::as_list).unwrap_or_default();
            FieldControl::CheckboxGroup {
                options: field
                    .options
                    .iter()
                    .map(|option| ChoiceView {
                        value: option.clone(),
                        checked: checked.contains(option),
                    })
                    .collect(),
            }
        }
        FieldType::Unknown => {
            tracing::debug!(field_key = %field.key, "Skipping field of unknown type");
            return None;
        }
    };
    Some(control)
}

/// The `(key, value)` change an event produces, or `None` when the field type
/// does not accept it.
pub fn handle_event(
    field: &FieldDefinition,
    current: Option<&FormValue>,
    event: FieldEvent,
) -> Option<(String, FormValue)> {
    let value = match (field.field_type, event) {
        (FieldType::Text | FieldType::Select | FieldType::Radio, FieldEvent::Input(text)) => {
            FormValue::Text(text)
        }
        (FieldType::Number, FieldEvent::Input(text)) => number_value(text),
        (FieldType::Checkbox, FieldEvent::Toggle { option, checked }) => {
            let current = current.and_then(FormValue::as_list).unwrap_or_default();
            FormValue::List(toggle_option(current, &option, checked))
        }
        // Comma separated list typed in one go
        (FieldType::Checkbox, FieldEvent::Input(text)) => FormValue::List(
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => return None,
    };
    Some((field.key.clone(), value))
}

/// Blank stays `''`; text that is not a number is kept so validation reports it.
fn number_value(text: String) -> FormValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FormValue::Text(String::new());
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => FormValue::Number(number),
        _ => FormValue::Text(text),
    }
}

/// Checking appends the option, unchecking removes it; the rest keep their order.
pub fn toggle_option(current: &[String], option: &str, checked: bool) -> Vec<String> {
    let mut next: Vec<String> = current
        .iter()
        .filter(|existing| existing.as_str() != option)
        .cloned()
        .collect();
    if checked {
        next.push(option.to_string());
    }
    next
}
