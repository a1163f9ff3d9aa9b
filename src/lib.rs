//! # Task Fields
//!
//! Typed custom fields for task templates, and the validation engine that guards them.
//!
//! A template author declares fields of five kinds (text, number, date, single-select and
//! multi-select), each with optional constraints. Values entered for a task are checked
//! against those declarations before they are stored.
//!
//! - [`fields`]: type descriptors ([`FieldType`]) and values ([`FieldValue`]), matched by [`FieldTypeKey`].
//! - [`constraints`]: single-bound checks shared by value validation and descriptor checks.
//! - [`validation`]: [`validate`] a value against a field, collecting every violation.
//! - [`definition`]: [`FieldDefinition`] and its default-value gate.
//! - [`schema`]: [`TaskTemplateSchema`], an immutable, id-unique, ordered field list.
//! - [`template`]: template-level gate checks and task-instance validation.
//!
//! ```
//! use task_fields::{validate, FieldDefinition, FieldType, FieldValue};
//!
//! let code = FieldDefinition::new(
//!     "code",
//!     "Code",
//!     FieldType::Text { max_length: Some(10), min_length: None, pattern: None },
//! );
//! let result = validate(&FieldValue::Text("hello world".into()), &code);
//! assert_eq!(result.errors(), &["Text exceeds maxLength of 10 characters".to_string()]);
//! ```
//!
//! Everything here is synchronous and free of shared state; schemas are values and every
//! edit returns a new one.

pub mod cli;
pub mod cmd;
pub mod constraints;
pub mod db;
pub mod definition;
pub mod fields;
pub mod ids;
pub mod schema;
pub mod template;
pub mod validation;

pub use definition::{CheckResult, FieldDefinition};
pub use fields::{FieldType, FieldTypeKey, FieldValue, SelectOption};
pub use ids::{IdGenerator, SlugIdGenerator};
pub use schema::{SchemaError, TaskTemplateSchema};
pub use template::{
    apply_defaults, check_field, validate_field_definition, validate_field_label, validate_fields,
    validate_instance, validate_title, FieldIssue, TaskTemplate,
};
pub use validation::{validate, validate_against_type, ValidationResult};
