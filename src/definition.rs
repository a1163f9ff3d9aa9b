//! Field definitions and descriptor well-formedness.

use serde::{Deserialize, Serialize};

use crate::constraints::*;
use crate::fields::{FieldType, FieldValue};
use crate::validation::validate;

/// Outcome of a gate check: success, or the one message explaining why not.
pub type CheckResult = Result<(), String>;

/// One custom field of a task template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        FieldDefinition {
            id: id.into(),
            label: label.into(),
            field_type,
            required: false,
            default_value: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Check the default value, if any, against this field's own type.
    ///
    /// Only the first violation is reported since this gates a save action.
    pub fn validate_configuration(&self) -> CheckResult {
        let Some(default) = &self.default_value else {
            return Ok(());
        };
        match validate(default, self).first_error() {
            None => Ok(()),
            Some(first) => Err(format!("Invalid default value: {}", first)),
        }
    }
}

impl FieldType {
    /// Every way this descriptor is itself malformed, in declaration order of its bounds.
    pub fn config_errors(&self) -> Vec<String> {
        let checks = match self {
            FieldType::Text { max_length, min_length, pattern } => vec![
                check_max_length(*max_length),
                check_min_length(*min_length),
                check_length_range(*min_length, *max_length),
                check_pattern(pattern.as_deref()),
            ],
            FieldType::Number { min, max, step, decimals } => vec![
                check_numeric_range(*min, *max),
                check_step(*step),
                check_decimals(*decimals),
            ],
            FieldType::Date { min_date, max_date, format } => vec![
                check_date(min_date.as_deref()),
                check_date(max_date.as_deref()),
                check_date_range(min_date.as_deref(), max_date.as_deref()),
                check_date_format(format.as_deref()),
            ],
            FieldType::SingleSelect { .. } => Vec::new(),
            FieldType::MultiSelect { min_selections, max_selections, .. } => vec![
                check_min_selections(*min_selections),
                check_max_selections(*max_selections),
                check_selection_range(*min_selections, *max_selections),
            ],
        };
        checks.into_iter().flatten().collect()
    }

    /// Render a value for display, honouring a date field's display pattern.
    pub fn display_value(&self, value: &FieldValue) -> String {
        match (self, value) {
            (FieldType::Date { format: Some(format), .. }, FieldValue::Date(raw))
                if check_date_format(Some(format.as_str())).is_none() =>
            {
                parse_date(raw).and_then(|date| format_date(date, format)).unwrap_or_else(|| raw.clone())
            }
            (FieldType::Number { decimals: Some(d), .. }, FieldValue::Number(n)) if check_decimals(Some(*d)).is_none() => {
                format!("{:.*}", *d as usize, n)
            }
            _ => value.to_string(),
        }
    }
}
