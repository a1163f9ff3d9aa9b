//! Task template schemas: ordered, id-unique collections of field definitions.
//!
//! A [`TaskTemplateSchema`] is an immutable value. Every structural edit returns a new
//! schema, and an edit that would break id uniqueness or field identity is rejected with
//! a [`SchemaError`] while the original schema stays as it was.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::definition::FieldDefinition;
use crate::ids::IdGenerator;

/// Structural edit rejected because it would violate a schema invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Field with id '{0}' already exists")]
    DuplicateFieldId(String),
    #[error("Cannot change field ID during update")]
    IdChangeOnUpdate,
    #[error("Field with id '{0}' not found")]
    FieldNotFound(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDefinition>", into = "Vec<FieldDefinition>")]
pub struct TaskTemplateSchema {
    fields: Vec<FieldDefinition>,
}

impl TaskTemplateSchema {
    /// Build a schema from an externally supplied field list, rejecting duplicate ids.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateFieldId(field.id.clone()));
            }
        }
        Ok(TaskTemplateSchema { fields })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get_field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn has_field(&self, id: &str) -> bool {
        self.get_field(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    pub fn required_fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().filter(|f| f.required).collect()
    }

    /// Fresh id for a new field labelled `label`.
    pub fn generate_id(&self, label: &str, ids: &dyn IdGenerator) -> String {
        ids.generate(label, &|candidate: &str| self.has_field(candidate))
    }

    /// Append `field`; rejected when its id is already present.
    pub fn add_field(&self, field: FieldDefinition) -> Result<Self, SchemaError> {
        if self.has_field(&field.id) {
            log::debug!("rejected add of duplicate field id {:?}", field.id);
            return Err(SchemaError::DuplicateFieldId(field.id));
        }
        let mut fields = self.fields.clone();
        fields.push(field);
        Ok(TaskTemplateSchema { fields })
    }

    /// Remove the field with `id`. Absent ids leave the schema unchanged.
    pub fn remove_field(&self, id: &str) -> Self {
        let fields = self.fields.iter().filter(|f| f.id != id).cloned().collect();
        TaskTemplateSchema { fields }
    }

    /// Replace the field with `id` in place. The replacement must keep the same id.
    pub fn update_field(&self, id: &str, updated: FieldDefinition) -> Result<Self, SchemaError> {
        let Some(index) = self.position(id) else {
            return Err(SchemaError::FieldNotFound(id.to_string()));
        };
        if updated.id != id {
            log::debug!("rejected update of {:?} that renames it to {:?}", id, updated.id);
            return Err(SchemaError::IdChangeOnUpdate);
        }
        let mut fields = self.fields.clone();
        fields[index] = updated;
        Ok(TaskTemplateSchema { fields })
    }

    /// Move the field at `from` so that it ends up at `to`.
    ///
    /// Out-of-range indices leave the schema unchanged rather than failing; drag-reorder
    /// callers may race with concurrent edits.
    pub fn reorder_field(&self, from: usize, to: usize) -> Self {
        let len = self.fields.len();
        if from >= len || to >= len {
            log::debug!("ignored reorder {} -> {} on {} fields", from, to, len);
            return self.clone();
        }
        let mut fields = self.fields.clone();
        let moved = fields.remove(from);
        fields.insert(to, moved);
        TaskTemplateSchema { fields }
    }

    /// Insert a copy of the field with `id` directly after it.
    ///
    /// The copy is labelled "<label> (copy)" and gets an id generated from that label.
    /// Absent ids leave the schema unchanged.
    pub fn duplicate_field(&self, id: &str, ids: &dyn IdGenerator) -> Result<Self, SchemaError> {
        let Some(index) = self.position(id) else {
            return Ok(self.clone());
        };
        let mut copy = self.fields[index].clone();
        copy.label = format!("{} (copy)", copy.label);
        copy.id = self.generate_id(&copy.label, ids);
        if self.has_field(&copy.id) {
            return Err(SchemaError::DuplicateFieldId(copy.id));
        }
        let mut fields = self.fields.clone();
        fields.insert(index + 1, copy);
        Ok(TaskTemplateSchema { fields })
    }
}

impl TryFrom<Vec<FieldDefinition>> for TaskTemplateSchema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldDefinition>) -> Result<Self, Self::Error> {
        TaskTemplateSchema::new(fields)
    }
}

impl From<TaskTemplateSchema> for Vec<FieldDefinition> {
    fn from(schema: TaskTemplateSchema) -> Self {
        schema.fields
    }
}
