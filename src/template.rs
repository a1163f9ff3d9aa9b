//! Template-level checks and task-instance validation.
//!
//! The `validate_*` gate checks answer one question each and stop at the first problem,
//! since they guard a single save action. [`validate_instance`] is the form-filling
//! counterpart: it reports every problem for every field of a task instance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::definition::{CheckResult, FieldDefinition};
use crate::fields::FieldValue;
use crate::schema::TaskTemplateSchema;
use crate::validation::validate;

pub fn validate_title(title: &str) -> CheckResult {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    Ok(())
}

pub fn validate_fields(fields: &[FieldDefinition]) -> CheckResult {
    if fields.is_empty() {
        return Err("At least one field is required".to_string());
    }
    Ok(())
}

pub fn validate_field_label(label: &str) -> CheckResult {
    if label.trim().is_empty() {
        return Err("Field label is required".to_string());
    }
    Ok(())
}

pub fn validate_field_definition(def: &FieldDefinition) -> CheckResult {
    def.validate_configuration()
}

/// A named task template: a title plus the schema of its custom fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskTemplate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: TaskTemplateSchema,
}

impl TaskTemplate {
    pub fn new(title: impl Into<String>) -> Self {
        TaskTemplate {
            title: title.into(),
            description: None,
            fields: TaskTemplateSchema::empty(),
        }
    }

    /// Run every template-level check; the first failure wins.
    ///
    /// Order: title, field count, then per field its label, its type descriptor and its
    /// default value. Field messages are prefixed with the field id.
    pub fn validate(&self) -> CheckResult {
        validate_title(&self.title)?;
        validate_fields(self.fields.fields())?;
        for def in self.fields.fields() {
            check_field(def).map_err(|e| format!("{}: {}", def.id, e))?;
        }
        Ok(())
    }
}

/// Gate a single field definition before it is saved: label, type descriptor, default value.
pub fn check_field(def: &FieldDefinition) -> CheckResult {
    validate_field_label(&def.label)?;
    if let Some(first) = def.field_type.config_errors().into_iter().next() {
        return Err(first);
    }
    validate_field_definition(def)
}

/// Problems with one field of a task instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field_id: String,
    pub errors: Vec<String>,
}

/// Fill in default values for fields the caller left out.
pub fn apply_defaults(schema: &TaskTemplateSchema, values: &BTreeMap<String, FieldValue>) -> BTreeMap<String, FieldValue> {
    let mut filled = values.clone();
    for def in schema.fields() {
        if let Some(default) = &def.default_value {
            filled.entry(def.id.clone()).or_insert_with(|| default.clone());
        }
    }
    filled
}

/// Validate the values of a task instance against its template schema.
///
/// Issues come in schema order, followed by values for ids the schema does not define.
/// An empty result means every value may be persisted. Empty values of optional fields
/// are accepted without constraint checks.
pub fn validate_instance(schema: &TaskTemplateSchema, values: &BTreeMap<String, FieldValue>) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for def in schema.fields() {
        let errors = match values.get(&def.id) {
            None => required_errors(def),
            Some(value) if value.is_empty() && value.key() == def.field_type.key() => required_errors(def),
            Some(value) => validate(value, def).errors().to_vec(),
        };
        if !errors.is_empty() {
            issues.push(FieldIssue { field_id: def.id.clone(), errors });
        }
    }
    for id in values.keys().filter(|id| !schema.has_field(id)) {
        issues.push(FieldIssue {
            field_id: id.clone(),
            errors: vec![format!("Unknown field '{}'", id)],
        });
    }
    log::debug!("instance validation found {} field issue(s)", issues.len());
    issues
}

fn required_errors(def: &FieldDefinition) -> Vec<String> {
    if def.required {
        vec![format!("{} is required", def.label)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldType, FieldTypeKey, SelectOption};

    fn text_field(id: &str, label: &str) -> FieldDefinition {
        FieldDefinition::new(id, label, FieldType::unconstrained(FieldTypeKey::Text))
    }

    fn sprint_template() -> TaskTemplate {
        let fields = TaskTemplateSchema::new(vec![
            text_field("summary", "Summary").required(true),
            FieldDefinition::new(
                "points",
                "Points",
                FieldType::Number { min: Some(0.0), max: Some(13.0), step: Some(1.0), decimals: Some(0) },
            ),
            FieldDefinition::new(
                "labels",
                "Labels",
                FieldType::MultiSelect {
                    options: vec![SelectOption::plain("ui"), SelectOption::plain("api")],
                    allow_custom: false,
                    min_selections: None,
                    max_selections: Some(1),
                },
            ),
        ])
        .unwrap();
        TaskTemplate { title: "Sprint story".into(), description: None, fields }
    }

    #[test]
    fn test_gate_checks() {
        assert_eq!(validate_title("  "), Err("Title is required".to_string()));
        assert_eq!(validate_title("Bug"), Ok(()));
        assert_eq!(validate_fields(&[]), Err("At least one field is required".to_string()));
        assert_eq!(validate_fields(&[text_field("a", "A")]), Ok(()));
        assert_eq!(validate_field_label(""), Err("Field label is required".to_string()));
        assert_eq!(validate_field_label("Owner"), Ok(()));
    }

    #[test]
    fn test_validate_field_definition_delegates_to_default_check() {
        let def = FieldDefinition::new(
            "n",
            "N",
            FieldType::Number { min: Some(1.0), max: None, step: None, decimals: None },
        )
        .with_default(FieldValue::Number(0.0));
        assert_eq!(
            validate_field_definition(&def),
            Err("Invalid default value: Number is less than minimum of 1".to_string())
        );
    }

    #[test]
    fn test_template_validate_order() {
        let mut template = sprint_template();
        assert_eq!(template.validate(), Ok(()));

        template.title = String::new();
        assert_eq!(template.validate(), Err("Title is required".to_string()));

        let empty = TaskTemplate::new("Empty");
        assert_eq!(empty.validate(), Err("At least one field is required".to_string()));

        let mut blank_label = sprint_template();
        blank_label.fields = blank_label.fields.update_field("points", text_field("points", " ")).unwrap();
        assert_eq!(blank_label.validate(), Err("points: Field label is required".to_string()));

        let mut broken_type = sprint_template();
        broken_type.fields = broken_type
            .fields
            .update_field(
                "points",
                FieldDefinition::new(
                    "points",
                    "Points",
                    FieldType::Number { min: Some(5.0), max: Some(1.0), step: None, decimals: None },
                ),
            )
            .unwrap();
        assert_eq!(broken_type.validate(), Err("points: Max must be ≥ min".to_string()));
    }

    #[test]
    fn test_validate_instance_reports_every_field() {
        let schema = sprint_template().fields;
        let mut values = BTreeMap::new();
        values.insert("points".to_string(), FieldValue::Number(21.0));
        values.insert("labels".to_string(), FieldValue::multi(["ui", "db"]));
        values.insert("colour".to_string(), FieldValue::Text("red".into()));

        let issues = validate_instance(&schema, &values);
        assert_eq!(
            issues,
            vec![
                FieldIssue { field_id: "summary".into(), errors: vec!["Summary is required".into()] },
                FieldIssue {
                    field_id: "points".into(),
                    errors: vec!["Number is greater than maximum of 13".into()],
                },
                FieldIssue {
                    field_id: "labels".into(),
                    errors: vec![
                        "Values [db] are not in allowed options: [ui, api]".into(),
                        "Must select at most 1 options".into(),
                    ],
                },
                FieldIssue { field_id: "colour".into(), errors: vec!["Unknown field 'colour'".into()] },
            ]
        );
    }

    #[test]
    fn test_validate_instance_accepts_valid_and_empty_optional() {
        let schema = sprint_template().fields;
        let mut values = BTreeMap::new();
        values.insert("summary".to_string(), FieldValue::Text("Login page".into()));
        values.insert("labels".to_string(), FieldValue::multi(Vec::<String>::new()));
        assert!(validate_instance(&schema, &values).is_empty());
    }

    #[test]
    fn test_empty_required_value_and_mismatch() {
        let schema = sprint_template().fields;
        let mut values = BTreeMap::new();
        values.insert("summary".to_string(), FieldValue::Text("   ".into()));
        values.insert("points".to_string(), FieldValue::Text("".into()));
        let issues = validate_instance(&schema, &values);
        assert_eq!(issues[0].errors, vec!["Summary is required".to_string()]);
        assert_eq!(issues[1].errors, vec!["Type mismatch: expected number, got text".to_string()]);
    }

    #[test]
    fn test_apply_defaults() {
        let schema = TaskTemplateSchema::new(vec![
            text_field("owner", "Owner").with_default(FieldValue::Text("team".into())),
            text_field("notes", "Notes"),
        ])
        .unwrap();
        let mut values = BTreeMap::new();
        values.insert("notes".to_string(), FieldValue::Text("n/a".into()));
        let filled = apply_defaults(&schema, &values);
        assert_eq!(filled.get("owner"), Some(&FieldValue::Text("team".into())));
        assert_eq!(filled.get("notes"), Some(&FieldValue::Text("n/a".into())));
    }
}
