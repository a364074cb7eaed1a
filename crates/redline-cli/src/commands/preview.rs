//! Preview the change records a source produces
//!
//! Usage: redline preview --source <FILE> [--mode row|cell] [--changes] [--json]

use crate::commands::{print_table, resolve_config, ModeArg};
use clap::Args;
use redline_core::model::Target;
use redline_core_types::RunContext;
use redline_engine::commands::engine_command::{apply_engine_command, EngineCommand};
use redline_engine::commands::update::SourceKind;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Highlighted source table (JSON or YAML)
    #[arg(long)]
    pub source: PathBuf,

    /// Treat the source as a pre-extracted change list
    #[arg(long)]
    pub changes: bool,

    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the records as a JSON change list
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args.config.as_deref(), args.mode)?;
    let kind = if args.changes {
        SourceKind::ChangeList
    } else {
        SourceKind::Table
    };

    let cmd = EngineCommand::Preview {
        source: args.source,
        kind,
    };
    let records = apply_engine_command(cmd, &config, &RunContext::new())?.into_preview()?;

    if args.json {
        let wire: Vec<_> = records.iter().map(|r| r.to_wire()).collect();
        println!("{}", serde_json::to_string_pretty(&wire)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No changes found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let column = match &r.target {
                Target::Row => "(row)".to_string(),
                Target::Cell(c) => c.clone(),
            };
            let value = match &r.target {
                Target::Row => r
                    .fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(", "),
                Target::Cell(_) => r.new_value.clone(),
            };
            vec![r.key.clone(), column, r.action.to_string(), value]
        })
        .collect();

    print_table(&["Key", "Column", "Action", "New value"], &rows);
    println!("{} change(s)", records.len());
    Ok(())
}
