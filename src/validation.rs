//! Field value validation.
//!
//! [`validate`] checks a runtime [`FieldValue`] against the type of a [`FieldDefinition`].
//! A type-key mismatch short-circuits with a single error. Otherwise every applicable
//! constraint is checked and all violations are returned together, in a fixed order.

use regex::Regex;

use crate::constraints::parse_date;
use crate::definition::FieldDefinition;
use crate::fields::{FieldType, FieldValue, SelectOption};

/// Outcome of validating one value. `Invalid` always carries at least one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<String>),
}

impl ValidationResult {
    /// `Valid` for an empty list, `Invalid` otherwise.
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors().first().map(String::as_str)
    }
}

/// Validate `value` against the type and constraints of `definition`.
pub fn validate(value: &FieldValue, definition: &FieldDefinition) -> ValidationResult {
    validate_against_type(value, &definition.field_type)
}

/// Validate `value` against a bare type descriptor.
///
/// The match is over the value; each arm destructures only the descriptor of the same kind,
/// so any other descriptor is a mismatch.
pub fn validate_against_type(value: &FieldValue, field_type: &FieldType) -> ValidationResult {
    let mut errors = Vec::new();
    match value {
        FieldValue::Text(text) => {
            let FieldType::Text { max_length, min_length, pattern } = field_type else {
                return type_mismatch(value, field_type);
            };
            check_text(text, *max_length, *min_length, pattern.as_deref(), &mut errors)
        }
        FieldValue::Number(n) => {
            let FieldType::Number { min, max, .. } = field_type else {
                return type_mismatch(value, field_type);
            };
            check_number(*n, *min, *max, &mut errors)
        }
        FieldValue::Date(date) => {
            let FieldType::Date { min_date, max_date, .. } = field_type else {
                return type_mismatch(value, field_type);
            };
            check_date_value(date, min_date.as_deref(), max_date.as_deref(), &mut errors)
        }
        FieldValue::SingleSelect(choice) => {
            let FieldType::SingleSelect { options, allow_custom } = field_type else {
                return type_mismatch(value, field_type);
            };
            if !allow_custom && !options.iter().any(|o| o.value == *choice) {
                errors.push(format!(
                    "Value '{}' is not in allowed options: {}",
                    choice,
                    format_option_values(options)
                ));
            }
        }
        FieldValue::MultiSelect(selected) => {
            let FieldType::MultiSelect { options, allow_custom, min_selections, max_selections } = field_type else {
                return type_mismatch(value, field_type);
            };
            if !allow_custom {
                let invalid: Vec<&str> = selected
                    .iter()
                    .filter(|s| !options.iter().any(|o| o.value == **s))
                    .map(String::as_str)
                    .collect();
                if !invalid.is_empty() {
                    errors.push(format!(
                        "Values [{}] are not in allowed options: {}",
                        invalid.join(", "),
                        format_option_values(options)
                    ));
                }
            }
            let count = selected.len() as i64;
            if let Some(min) = min_selections {
                if count < *min {
                    errors.push(format!("Must select at least {} options", min));
                }
            }
            if let Some(max) = max_selections {
                if count > *max {
                    errors.push(format!("Must select at most {} options", max));
                }
            }
        }
    }

    ValidationResult::from_errors(errors)
}

fn type_mismatch(value: &FieldValue, field_type: &FieldType) -> ValidationResult {
    ValidationResult::Invalid(vec![format!(
        "Type mismatch: expected {}, got {}",
        field_type.key(),
        value.key()
    )])
}

fn check_text(
    text: &str,
    max_length: Option<i64>,
    min_length: Option<i64>,
    pattern: Option<&str>,
    errors: &mut Vec<String>,
) {
    let length = text.chars().count() as i64;
    if let Some(max) = max_length {
        if length > max {
            errors.push(format!("Text exceeds maxLength of {} characters", max));
        }
    }
    if let Some(min) = min_length {
        if length < min {
            errors.push(format!("Text is shorter than minLength of {} characters", min));
        }
    }
    if let Some(pattern) = pattern {
        match Regex::new(pattern) {
            Ok(re) => {
                if !re.is_match(text) {
                    errors.push("Text does not match required pattern".to_string());
                }
            }
            Err(e) => {
                log::warn!("stored text pattern {:?} does not compile: {}", pattern, e);
                errors.push("Invalid pattern in field definition".to_string());
            }
        }
    }
}

fn check_number(n: f64, min: Option<f64>, max: Option<f64>, errors: &mut Vec<String>) {
    if let Some(min) = min {
        if n < min {
            errors.push(format!("Number is less than minimum of {}", min));
        }
    }
    if let Some(max) = max {
        if n > max {
            errors.push(format!("Number is greater than maximum of {}", max));
        }
    }
}

fn check_date_value(date: &str, min_date: Option<&str>, max_date: Option<&str>, errors: &mut Vec<String>) {
    let Some(parsed) = parse_date(date) else {
        errors.push("Invalid date (use YYYY-MM-DD)".to_string());
        return;
    };
    if let Some(min) = min_date {
        match parse_date(min) {
            Some(bound) if parsed < bound => errors.push(format!("Date is before minimum date of {}", min)),
            Some(_) => {}
            None => {
                log::warn!("stored minimum date {:?} is not YYYY-MM-DD", min);
                errors.push("Invalid minimum date in field definition".to_string());
            }
        }
    }
    if let Some(max) = max_date {
        match parse_date(max) {
            Some(bound) if parsed > bound => errors.push(format!("Date is after maximum date of {}", max)),
            Some(_) => {}
            None => {
                log::warn!("stored maximum date {:?} is not YYYY-MM-DD", max);
                errors.push("Invalid maximum date in field definition".to_string());
            }
        }
    }
}

fn format_option_values(options: &[SelectOption]) -> String {
    let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
    format!("[{}]", values.join(", "))
}
