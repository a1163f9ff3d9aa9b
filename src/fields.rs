//! Field type descriptors and field values.
//!
//! A [`FieldType`] describes the kind of a custom task field together with its constraints.
//! A [`FieldValue`] is a concrete runtime value for one of those kinds. Both carry the same
//! [`FieldTypeKey`], which is what the validator compares before any constraint check runs.

use std::collections::BTreeSet;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Stable discriminant shared by a field type and the values it accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum FieldTypeKey {
    Text,
    Number,
    Date,
    SingleSelect,
    MultiSelect,
}

impl FieldTypeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::SingleSelect => "single_select",
            Self::MultiSelect => "multi_select",
        }
    }
}

impl fmt::Display for FieldTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One choice offered by a select field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        SelectOption { value: value.into(), label: label.into() }
    }

    /// Option whose label is the value itself.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        SelectOption { label: value.clone(), value }
    }
}

/// The kind of a custom field and the constraints its values must satisfy.
///
/// Every bound is optional; an unset bound imposes no restriction. Lengths and selection
/// counts are signed so that a malformed stored descriptor can still be loaded and reported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Input step hint. Never constrains values.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        /// Display precision hint. Never constrains values.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decimals: Option<i32>,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_date: Option<String>,
        /// strftime pattern used when rendering values.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    SingleSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
        #[serde(default)]
        allow_custom: bool,
    },
    MultiSelect {
        #[serde(default)]
        options: Vec<SelectOption>,
        #[serde(default)]
        allow_custom: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_selections: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_selections: Option<i64>,
    },
}

impl FieldType {
    pub fn key(&self) -> FieldTypeKey {
        match self {
            FieldType::Text { .. } => FieldTypeKey::Text,
            FieldType::Number { .. } => FieldTypeKey::Number,
            FieldType::Date { .. } => FieldTypeKey::Date,
            FieldType::SingleSelect { .. } => FieldTypeKey::SingleSelect,
            FieldType::MultiSelect { .. } => FieldTypeKey::MultiSelect,
        }
    }

    /// Unconstrained descriptor for the given kind.
    pub fn unconstrained(key: FieldTypeKey) -> Self {
        match key {
            FieldTypeKey::Text => FieldType::Text { max_length: None, min_length: None, pattern: None },
            FieldTypeKey::Number => FieldType::Number { min: None, max: None, step: None, decimals: None },
            FieldTypeKey::Date => FieldType::Date { min_date: None, max_date: None, format: None },
            FieldTypeKey::SingleSelect => FieldType::SingleSelect { options: Vec::new(), allow_custom: false },
            FieldTypeKey::MultiSelect => FieldType::MultiSelect {
                options: Vec::new(),
                allow_custom: false,
                min_selections: None,
                max_selections: None,
            },
        }
    }
}

/// A runtime value for a custom field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// Calendar date as `YYYY-MM-DD`.
    Date(String),
    SingleSelect(String),
    MultiSelect(BTreeSet<String>),
}

impl FieldValue {
    pub fn key(&self) -> FieldTypeKey {
        match self {
            FieldValue::Text(_) => FieldTypeKey::Text,
            FieldValue::Number(_) => FieldTypeKey::Number,
            FieldValue::Date(_) => FieldTypeKey::Date,
            FieldValue::SingleSelect(_) => FieldTypeKey::SingleSelect,
            FieldValue::MultiSelect(_) => FieldTypeKey::MultiSelect,
        }
    }

    /// Whether the value counts as "not filled in" for required-field checks.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) | FieldValue::SingleSelect(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::MultiSelect(set) => set.is_empty(),
        }
    }

    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::MultiSelect(values.into_iter().map(Into::into).collect())
    }

    /// Parse command-line text into a value of the given field type's kind.
    ///
    /// Multi-select input is comma-separated; blank parts are dropped. Only numbers can fail
    /// here, everything else is checked later by the validator.
    pub fn parse_for(field_type: &FieldType, raw: &str) -> Result<Self, String> {
        let value = match field_type.key() {
            FieldTypeKey::Text => FieldValue::Text(raw.to_string()),
            FieldTypeKey::Number => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => FieldValue::Number(n),
                _ => return Err(format!("Not a number: '{}'", raw)),
            },
            FieldTypeKey::Date => FieldValue::Date(raw.trim().to_string()),
            FieldTypeKey::SingleSelect => FieldValue::SingleSelect(raw.trim().to_string()),
            FieldTypeKey::MultiSelect => FieldValue::multi(
                raw.split(',').map(str::trim).filter(|s| !s.is_empty()),
            ),
        };
        Ok(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) | FieldValue::SingleSelect(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::MultiSelect(set) => {
                let parts: Vec<&str> = set.iter().map(String::as_str).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}
