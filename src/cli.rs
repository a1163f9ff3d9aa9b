use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Define typed custom fields for task templates and validate values against them.
/// Templates are stored in ~/.pm/field_templates.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "taskfields", version, about = "Task template field schemas and validation")]
pub struct Cli {
    /// Path to the JSON template store.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log engine decisions to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
