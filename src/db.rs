//! Template store and display helpers for the command-line interface.
//!
//! Templates live in a single JSON file. Loading goes through the schema's own
//! deserialisation, so a file with duplicate field ids inside one template is rejected.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::definition::FieldDefinition;
use crate::fields::FieldType;
use crate::template::TaskTemplate;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed template store: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory set of task templates.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub templates: Vec<TaskTemplate>,
}

impl Database {
    /// Load the store, starting empty if the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        if !path.exists() {
            log::debug!("no template store at {}, starting empty", path.display());
            return Ok(Database::default());
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let db: Database = serde_json::from_str(&buf)?;
        log::debug!("loaded {} template(s) from {}", db.templates.len(), path.display());
        Ok(db)
    }

    /// Save using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), DbError> {
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&TaskTemplate> {
        self.templates.get(index)
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.templates.iter().any(|t| t.title.eq_ignore_ascii_case(title.trim()))
    }
}

/// Resolve a template identifier (1-based position or title) to its index.
pub fn resolve_template(identifier: &str, db: &Database) -> Result<usize, String> {
    if let Ok(n) = identifier.parse::<usize>() {
        return match n.checked_sub(1).filter(|i| *i < db.templates.len()) {
            Some(i) => Ok(i),
            None => Err(format!("Template #{} not found", n)),
        };
    }

    let matches: Vec<usize> = db
        .templates
        .iter()
        .enumerate()
        .filter(|(_, t)| t.title.to_lowercase() == identifier.trim().to_lowercase())
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [] => Err(format!("No template found with title '{}'", identifier)),
        [i] => Ok(*i),
        many => {
            let positions: Vec<String> = many.iter().map(|i| format!("#{}", i + 1)).collect();
            Err(format!(
                "Multiple templates titled '{}' ({}). Please use the number instead.",
                identifier,
                positions.join(", ")
            ))
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// One-line summary of the constraints set on a type descriptor.
pub fn format_constraints(field_type: &FieldType) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut push = |name: &str, value: Option<String>| {
        if let Some(v) = value {
            parts.push(format!("{}={}", name, v));
        }
    };
    match field_type {
        FieldType::Text { max_length, min_length, pattern } => {
            push("min_length", min_length.map(|n| n.to_string()));
            push("max_length", max_length.map(|n| n.to_string()));
            push("pattern", pattern.clone());
        }
        FieldType::Number { min, max, step, decimals } => {
            push("min", min.map(|n| n.to_string()));
            push("max", max.map(|n| n.to_string()));
            push("step", step.map(|n| n.to_string()));
            push("decimals", decimals.map(|n| n.to_string()));
        }
        FieldType::Date { min_date, max_date, format } => {
            push("min_date", min_date.clone());
            push("max_date", max_date.clone());
            push("format", format.clone());
        }
        FieldType::SingleSelect { options, allow_custom } => {
            push("options", Some(format_options(options.iter().map(|o| o.value.as_str()))));
            push("custom", allow_custom.then(|| "yes".to_string()));
        }
        FieldType::MultiSelect { options, allow_custom, min_selections, max_selections } => {
            push("options", Some(format_options(options.iter().map(|o| o.value.as_str()))));
            push("custom", allow_custom.then(|| "yes".to_string()));
            push("min", min_selections.map(|n| n.to_string()));
            push("max", max_selections.map(|n| n.to_string()));
        }
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

fn format_options<'a>(values: impl Iterator<Item = &'a str>) -> String {
    format!("[{}]", values.collect::<Vec<_>>().join(","))
}

/// Print the fields of a schema as a table, in schema order.
pub fn print_fields(fields: &[FieldDefinition]) {
    println!(
        "{:<4} {:<18} {:<22} {:<14} {:<4} {:<14} {}",
        "#", "ID", "Label", "Type", "Req", "Default", "Constraints"
    );
    for (i, def) in fields.iter().enumerate() {
        let default = def
            .default_value
            .as_ref()
            .map(|v| def.field_type.display_value(v))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<4} {:<18} {:<22} {:<14} {:<4} {:<14} {}",
            i,
            truncate(&def.id, 18),
            truncate(&def.label, 22),
            def.field_type.key(),
            if def.required { "yes" } else { "-" },
            truncate(&default, 14),
            format_constraints(&def.field_type)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldTypeKey, SelectOption};
    use crate::schema::TaskTemplateSchema;

    fn db_with(titles: &[&str]) -> Database {
        Database { templates: titles.iter().map(|t| TaskTemplate::new(*t)).collect() }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field_templates.json");

        let mut template = TaskTemplate::new("Bug report");
        template.fields = TaskTemplateSchema::new(vec![FieldDefinition::new(
            "severity",
            "Severity",
            FieldType::SingleSelect { options: vec![SelectOption::plain("low")], allow_custom: false },
        )])
        .unwrap();
        let db = Database { templates: vec![template.clone()] };
        db.save(&path).unwrap();

        let loaded = Database::load(&path).unwrap();
        assert_eq!(loaded.templates, vec![template]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::load(&dir.path().join("absent.json")).unwrap();
        assert!(db.templates.is_empty());
    }

    #[test]
    fn test_load_rejects_duplicate_field_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let json = r#"{"templates":[{"title":"T","fields":[
            {"id":"a","label":"A","type":{"type":"text"}},
            {"id":"a","label":"B","type":{"type":"number"}}]}]}"#;
        fs::write(&path, json).unwrap();
        let err = Database::load(&path).unwrap_err();
        assert!(matches!(err, DbError::Json(_)));
        assert!(err.to_string().contains("Field with id 'a' already exists"));
    }

    #[test]
    fn test_resolve_template() {
        let db = db_with(&["Bug", "Feature", "bug"]);
        assert_eq!(resolve_template("2", &db), Ok(1));
        assert_eq!(resolve_template("feature", &db), Ok(1));
        assert_eq!(resolve_template("0", &db), Err("Template #0 not found".to_string()));
        assert_eq!(resolve_template("9", &db), Err("Template #9 not found".to_string()));
        assert!(resolve_template("Bug", &db).unwrap_err().contains("#1, #3"));
        assert!(resolve_template("Chore", &db).is_err());
        assert!(db.has_title(" FEATURE "));
    }

    #[test]
    fn test_format_constraints() {
        let number = FieldType::Number { min: Some(0.0), max: Some(5.5), step: None, decimals: None };
        assert_eq!(format_constraints(&number), "min=0 max=5.5");
        assert_eq!(format_constraints(&FieldType::unconstrained(FieldTypeKey::Date)), "-");
        let multi = FieldType::MultiSelect {
            options: vec![SelectOption::plain("a"), SelectOption::plain("b")],
            allow_custom: true,
            min_selections: Some(1),
            max_selections: None,
        };
        assert_eq!(format_constraints(&multi), "options=[a,b] custom=yes min=1");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long label", 6), "a lon…");
    }
}
