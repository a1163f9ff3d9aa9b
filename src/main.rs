//! # taskfields - custom field schemas for task templates
//!
//! Command-line front end for the `task_fields` engine. Templates are stored locally in
//! `~/.pm/field_templates.json` (or the file given with `--db`).
//!
//! ```bash
//! # Create a template and give it typed fields
//! taskfields template create "Bug report"
//! taskfields field add "Bug report" Severity --type single_select --option low --option high --required
//! taskfields field add "Bug report" "Story points" --type number --min 0 --max 13
//!
//! # Check the template, then validate values for a task
//! taskfields template check "Bug report"
//! taskfields validate "Bug report" --value severity=high --value story_points=20
//! ```

use std::path::PathBuf;

use clap::Parser;

use task_fields::cli::Cli;
use task_fields::cmd::*;
use task_fields::db::Database;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let db_path = cli.db.clone().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let pm_dir = PathBuf::from(home).join(".pm");
        if let Err(e) = std::fs::create_dir_all(&pm_dir) {
            eprintln!("Failed to create directory {}: {}", pm_dir.display(), e);
            std::process::exit(1);
        }
        pm_dir.join("field_templates.json")
    });
    log::debug!("using template store {}", db_path.display());

    let mut db = match Database::load(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load {}: {}", db_path.display(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Template { action } => cmd_template(&mut db, &db_path, action),
        Commands::Field { action } => cmd_field(&mut db, &db_path, action),
        Commands::Validate { template, values, values_file, no_defaults } => {
            cmd_validate(&db, template, values, values_file, no_defaults)
        }
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
