//! Command implementations for the CLI interface.
//!
//! Each handler loads what it needs from the template store, runs the engine, prints a
//! result and persists the new schema when an edit succeeded. Failures are printed to
//! stderr and end the process with exit code 1.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};

use crate::db::*;
use crate::definition::FieldDefinition;
use crate::fields::{FieldType, FieldTypeKey, FieldValue, SelectOption};
use crate::ids::SlugIdGenerator;
use crate::template::{apply_defaults, check_field, validate_instance, validate_title, FieldIssue, TaskTemplate};

#[derive(Subcommand)]
pub enum Commands {
    /// Manage task templates.
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Edit the custom fields of a template.
    Field {
        #[command(subcommand)]
        action: FieldAction,
    },

    /// Validate task values against a template's fields.
    Validate {
        /// Template number or title.
        template: String,
        /// Field value as id=value. May be repeated. Multi-select values are comma-separated.
        #[arg(long = "value")]
        values: Vec<String>,
        /// JSON file mapping field ids to typed values.
        #[arg(long)]
        values_file: Option<PathBuf>,
        /// Do not fill in default values for missing fields.
        #[arg(long)]
        no_defaults: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Create a new, empty template.
    Create {
        /// Template title
        title: String,
        /// Optional description
        #[arg(long)]
        desc: Option<String>,
    },
    /// List all templates.
    List,
    /// Show a template and its fields.
    Show {
        /// Template number or title
        template: String,
    },
    /// Delete a template.
    Delete {
        /// Template number or title
        template: String,
    },
    /// Run template-level checks before the template is used.
    Check {
        /// Template number or title
        template: String,
    },
}

#[derive(Subcommand)]
pub enum FieldAction {
    /// Append a field to a template.
    Add {
        /// Template number or title
        template: String,
        /// Display label
        label: String,
        /// Field type
        #[arg(long = "type", value_enum)]
        field_type: FieldTypeKey,
        /// Field id (generated from the label when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Mark the field as required.
        #[arg(long)]
        required: bool,
        /// Default value, in the same text form as `validate --value`.
        #[arg(long)]
        default: Option<String>,
        #[command(flatten)]
        constraints: ConstraintArgs,
    },
    /// Change a field in place. Only the given options are changed.
    Update {
        /// Template number or title
        template: String,
        /// Field id
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        required: Option<bool>,
        #[arg(long)]
        default: Option<String>,
        /// Remove the default value.
        #[arg(long, conflicts_with = "default")]
        clear_default: bool,
        #[command(flatten)]
        constraints: ConstraintArgs,
    },
    /// Remove a field.
    Remove {
        /// Template number or title
        template: String,
        /// Field id
        id: String,
    },
    /// Move the field at one 0-based position to another.
    Move {
        /// Template number or title
        template: String,
        from: usize,
        to: usize,
    },
    /// Insert a copy of a field right after it.
    Duplicate {
        /// Template number or title
        template: String,
        /// Field id
        id: String,
    },
}

/// Constraint options shared by `field add` and `field update`.
#[derive(Args, Debug, Default, Clone)]
pub struct ConstraintArgs {
    /// Text: maximum length in characters.
    #[arg(long, allow_negative_numbers = true)]
    pub max_length: Option<i64>,
    /// Text: minimum length in characters.
    #[arg(long, allow_negative_numbers = true)]
    pub min_length: Option<i64>,
    /// Text: regular expression values must match.
    #[arg(long)]
    pub pattern: Option<String>,
    /// Number: lower bound.
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,
    /// Number: upper bound.
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
    /// Number: input step.
    #[arg(long, allow_negative_numbers = true)]
    pub step: Option<f64>,
    /// Number: display precision.
    #[arg(long, allow_negative_numbers = true)]
    pub decimals: Option<i32>,
    /// Date: earliest date, YYYY-MM-DD.
    #[arg(long)]
    pub min_date: Option<String>,
    /// Date: latest date, YYYY-MM-DD.
    #[arg(long)]
    pub max_date: Option<String>,
    /// Date: strftime display pattern, e.g. "%d/%m/%Y".
    #[arg(long)]
    pub format: Option<String>,
    /// Select: option as value or value=Label. May be repeated; replaces existing options.
    #[arg(long = "option")]
    pub options: Vec<String>,
    /// Select: accept values outside the option list.
    #[arg(long)]
    pub allow_custom: Option<bool>,
    /// Multi-select: minimum number of selections.
    #[arg(long, allow_negative_numbers = true)]
    pub min_selections: Option<i64>,
    /// Multi-select: maximum number of selections.
    #[arg(long, allow_negative_numbers = true)]
    pub max_selections: Option<i64>,
}

impl ConstraintArgs {
    /// Overlay the options that were given onto `field_type`.
    ///
    /// Options that make no sense for the field's kind are rejected rather than ignored.
    pub fn apply(&self, field_type: FieldType) -> Result<FieldType, String> {
        let key = field_type.key();
        let stray: Vec<&str> = self
            .given()
            .into_iter()
            .filter(|(_, kinds)| !kinds.contains(&key))
            .map(|(name, _)| name)
            .collect();
        if !stray.is_empty() {
            return Err(format!("{} not applicable to {} fields", stray.join(", "), key));
        }

        let options: Vec<SelectOption> = self.options.iter().map(|raw| parse_option(raw)).collect();
        let updated = match field_type {
            FieldType::Text { max_length, min_length, pattern } => FieldType::Text {
                max_length: self.max_length.or(max_length),
                min_length: self.min_length.or(min_length),
                pattern: self.pattern.clone().or(pattern),
            },
            FieldType::Number { min, max, step, decimals } => FieldType::Number {
                min: self.min.or(min),
                max: self.max.or(max),
                step: self.step.or(step),
                decimals: self.decimals.or(decimals),
            },
            FieldType::Date { min_date, max_date, format } => FieldType::Date {
                min_date: self.min_date.clone().or(min_date),
                max_date: self.max_date.clone().or(max_date),
                format: self.format.clone().or(format),
            },
            FieldType::SingleSelect { options: existing, allow_custom } => FieldType::SingleSelect {
                options: if options.is_empty() { existing } else { options },
                allow_custom: self.allow_custom.unwrap_or(allow_custom),
            },
            FieldType::MultiSelect { options: existing, allow_custom, min_selections, max_selections } => {
                FieldType::MultiSelect {
                    options: if options.is_empty() { existing } else { options },
                    allow_custom: self.allow_custom.unwrap_or(allow_custom),
                    min_selections: self.min_selections.or(min_selections),
                    max_selections: self.max_selections.or(max_selections),
                }
            }
        };
        Ok(updated)
    }

    fn given(&self) -> Vec<(&'static str, &'static [FieldTypeKey])> {
        use FieldTypeKey::*;
        const SELECTS: &[FieldTypeKey] = &[SingleSelect, MultiSelect];
        let all: [(bool, &'static str, &'static [FieldTypeKey]); 14] = [
            (self.max_length.is_some(), "--max-length", &[Text]),
            (self.min_length.is_some(), "--min-length", &[Text]),
            (self.pattern.is_some(), "--pattern", &[Text]),
            (self.min.is_some(), "--min", &[Number]),
            (self.max.is_some(), "--max", &[Number]),
            (self.step.is_some(), "--step", &[Number]),
            (self.decimals.is_some(), "--decimals", &[Number]),
            (self.min_date.is_some(), "--min-date", &[Date]),
            (self.max_date.is_some(), "--max-date", &[Date]),
            (self.format.is_some(), "--format", &[Date]),
            (!self.options.is_empty(), "--option", SELECTS),
            (self.allow_custom.is_some(), "--allow-custom", SELECTS),
            (self.min_selections.is_some(), "--min-selections", &[MultiSelect]),
            (self.max_selections.is_some(), "--max-selections", &[MultiSelect]),
        ];
        all.into_iter().filter(|(set, _, _)| *set).map(|(_, name, kinds)| (name, kinds)).collect()
    }
}

/// Parse `value` or `value=Label` into a select option.
pub fn parse_option(raw: &str) -> SelectOption {
    match raw.split_once('=') {
        Some((value, label)) if !label.trim().is_empty() => SelectOption::new(value.trim(), label.trim()),
        Some((value, _)) => SelectOption::plain(value.trim()),
        None => SelectOption::plain(raw.trim()),
    }
}

fn die(message: impl Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn persist(db: &Database, db_path: &Path) {
    if let Err(e) = db.save(db_path) {
        die(format!("Failed to save template store: {}", e));
    }
}

fn resolve_or_die(identifier: &str, db: &Database) -> usize {
    resolve_template(identifier, db).unwrap_or_else(|e| die(format!("Error resolving template: {}", e)))
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Handle template management commands.
pub fn cmd_template(db: &mut Database, db_path: &Path, action: TemplateAction) {
    match action {
        TemplateAction::Create { title, desc } => {
            if let Err(e) = validate_title(&title) {
                die(e);
            }
            if db.has_title(&title) {
                die(format!("Template '{}' already exists. Use a different title.", title.trim()));
            }
            let mut template = TaskTemplate::new(title.trim());
            template.description = desc;
            db.templates.push(template);
            persist(db, db_path);
            println!("Created template '{}' (#{})", title.trim(), db.templates.len());
        }

        TemplateAction::List => {
            if db.templates.is_empty() {
                println!("No templates found.");
                return;
            }
            println!("{:<4} {:<30} {:<7} {}", "#", "Title", "Fields", "Required");
            for (i, template) in db.templates.iter().enumerate() {
                println!(
                    "{:<4} {:<30} {:<7} {}",
                    i + 1,
                    truncate(&template.title, 30),
                    template.fields.len(),
                    template.fields.required_fields().len()
                );
            }
        }

        TemplateAction::Show { template } => {
            let idx = resolve_or_die(&template, db);
            let Some(template) = db.get(idx) else {
                die(format!("Template #{} not found.", idx + 1));
            };
            println!("Title:        {}", template.title);
            println!("Description:  {}", template.description.as_deref().unwrap_or("-"));
            println!("Fields:       {}", template.fields.len());
            if !template.fields.is_empty() {
                println!();
                print_fields(template.fields.fields());
            }
        }

        TemplateAction::Delete { template } => {
            let idx = resolve_or_die(&template, db);
            let removed = db.templates.remove(idx);
            persist(db, db_path);
            println!("Deleted template '{}'", removed.title);
        }

        TemplateAction::Check { template } => {
            let idx = resolve_or_die(&template, db);
            let template = &db.templates[idx];
            match template.validate() {
                Ok(()) => println!("Template '{}' is ready to use.", template.title),
                Err(e) => die(format!("Template '{}' is not valid: {}", template.title, e)),
            }
        }
    }
}

/// Handle field editing commands.
pub fn cmd_field(db: &mut Database, db_path: &Path, action: FieldAction) {
    match action {
        FieldAction::Add { template, label, field_type, id, required, default, constraints } => {
            let idx = resolve_or_die(&template, db);
            let schema = &db.templates[idx].fields;

            let field_type = constraints
                .apply(FieldType::unconstrained(field_type))
                .unwrap_or_else(|e| die(e));
            let id = id.unwrap_or_else(|| schema.generate_id(&label, &SlugIdGenerator));
            let mut def = FieldDefinition::new(id.clone(), label, field_type).required(required);
            if let Some(raw) = default {
                def.default_value = Some(parse_default(&def, &raw));
            }
            if let Err(e) = check_field(&def) {
                die(format!("Field '{}' is not valid: {}", id, e));
            }

            let fields = schema.add_field(def).unwrap_or_else(|e| die(e));
            db.templates[idx].fields = fields;
            persist(db, db_path);
            println!("Added field '{}' to '{}'", id, db.templates[idx].title);
        }

        FieldAction::Update { template, id, label, required, default, clear_default, constraints } => {
            let idx = resolve_or_die(&template, db);
            let schema = &db.templates[idx].fields;

            let Some(mut def) = schema.get_field(&id).cloned() else {
                die(format!("Field '{}' not found in '{}'", id, db.templates[idx].title));
            };
            if let Some(label) = label {
                def.label = label;
            }
            if let Some(required) = required {
                def.required = required;
            }
            def.field_type = constraints.apply(def.field_type).unwrap_or_else(|e| die(e));
            if clear_default {
                def.default_value = None;
            }
            if let Some(raw) = default {
                def.default_value = Some(parse_default(&def, &raw));
            }
            if let Err(e) = check_field(&def) {
                die(format!("Field '{}' is not valid: {}", id, e));
            }

            let fields = schema.update_field(&id, def).unwrap_or_else(|e| die(e));
            db.templates[idx].fields = fields;
            persist(db, db_path);
            println!("Updated field '{}'", id);
        }

        FieldAction::Remove { template, id } => {
            let idx = resolve_or_die(&template, db);
            let schema = &db.templates[idx].fields;
            if !schema.has_field(&id) {
                println!("No field '{}' in '{}'; nothing removed.", id, db.templates[idx].title);
                return;
            }
            db.templates[idx].fields = schema.remove_field(&id);
            persist(db, db_path);
            println!("Removed field '{}'", id);
        }

        FieldAction::Move { template, from, to } => {
            let idx = resolve_or_die(&template, db);
            let schema = &db.templates[idx].fields;
            let moved = schema.reorder_field(from, to);
            if moved == *schema {
                println!("Field order unchanged ({} fields).", schema.len());
                return;
            }
            db.templates[idx].fields = moved;
            persist(db, db_path);
            println!("Moved field {} -> {}", from, to);
        }

        FieldAction::Duplicate { template, id } => {
            let idx = resolve_or_die(&template, db);
            let schema = &db.templates[idx].fields;
            let Some(pos) = schema.position(&id) else {
                println!("No field '{}' in '{}'; nothing duplicated.", id, db.templates[idx].title);
                return;
            };
            let fields = schema
                .duplicate_field(&id, &SlugIdGenerator)
                .unwrap_or_else(|e| die(e));
            let copy_id = fields.fields()[pos + 1].id.clone();
            db.templates[idx].fields = fields;
            persist(db, db_path);
            println!("Duplicated '{}' as '{}'", id, copy_id);
        }
    }
}

fn parse_default(def: &FieldDefinition, raw: &str) -> FieldValue {
    FieldValue::parse_for(&def.field_type, raw)
        .unwrap_or_else(|e| die(format!("Invalid default value: {}", e)))
}

/// Validate task values against a template and print every problem found.
pub fn cmd_validate(
    db: &Database,
    template: String,
    raw_values: Vec<String>,
    values_file: Option<PathBuf>,
    no_defaults: bool,
) {
    let idx = resolve_or_die(&template, db);
    let template = &db.templates[idx];
    let schema = &template.fields;

    let mut values: BTreeMap<String, FieldValue> = BTreeMap::new();
    if let Some(path) = values_file {
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| die(format!("Failed to read {}: {}", path.display(), e)));
        let typed: BTreeMap<String, FieldValue> = serde_json::from_str(&data)
            .unwrap_or_else(|e| die(format!("Malformed values file {}: {}", path.display(), e)));
        values.extend(typed);
    }

    let mut parse_issues = Vec::new();
    for raw in &raw_values {
        let Some((id, text)) = raw.split_once('=') else {
            die(format!("Expected id=value, got '{}'", raw));
        };
        let id = id.trim();
        match schema.get_field(id) {
            Some(def) => match FieldValue::parse_for(&def.field_type, text) {
                Ok(value) => {
                    values.insert(id.to_string(), value);
                }
                Err(e) => parse_issues.push(FieldIssue { field_id: id.to_string(), errors: vec![e] }),
            },
            // Kept so the unknown id is reported.
            None => {
                values.insert(id.to_string(), FieldValue::Text(text.to_string()));
            }
        }
    }

    if !no_defaults {
        values = apply_defaults(schema, &values);
    }

    let unparsed: HashSet<String> = parse_issues.iter().map(|i| i.field_id.clone()).collect();
    let mut issues = parse_issues;
    issues.extend(
        validate_instance(schema, &values)
            .into_iter()
            .filter(|issue| !unparsed.contains(&issue.field_id)),
    );

    if issues.is_empty() {
        println!("All {} value(s) are valid for '{}'.", values.len(), template.title);
        return;
    }

    for issue in &issues {
        let label = schema
            .get_field(&issue.field_id)
            .map(|def| def.label.as_str())
            .unwrap_or(issue.field_id.as_str());
        for error in &issue.errors {
            println!("✗ {:<20} {}", truncate(label, 20), error);
        }
    }
    die(format!("{} field(s) rejected.", issues.len()));
}
