//! Run the full update pipeline
//!
//! Usage: redline apply --source <FILE> --dest <FILE> [--changes] [--json]

use crate::commands::{resolve_config, ModeArg};
use clap::Args;
use redline_core_types::RunContext;
use redline_engine::commands::engine_command::{apply_engine_command, EngineCommand};
use redline_engine::commands::update::{SourceKind, UpdateRequest, UpdateStatus};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Highlighted source table, or a change list with --changes
    #[arg(long)]
    pub source: PathBuf,

    /// Workbook holding the version chain
    #[arg(long)]
    pub dest: PathBuf,

    /// Treat the source as a pre-extracted change list
    #[arg(long)]
    pub changes: bool,

    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ApplyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(args.config.as_deref(), args.mode)?;
    let request = UpdateRequest {
        source: args.source,
        destination: args.dest,
        source_kind: if args.changes {
            SourceKind::ChangeList
        } else {
            SourceKind::Table
        },
    };

    let outcome = apply_engine_command(
        EngineCommand::Update(request),
        &config,
        &RunContext::new(),
    )?
    .into_update()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match &outcome.status {
        UpdateStatus::Success { version, path } => {
            println!("Version committed:");
            println!("  version: V{}", version);
            println!("  path: {}", path.display());
        }
        UpdateStatus::Degraded {
            version,
            alternate_path,
            reason,
        } => {
            println!("Version saved to alternate file (destination could not be replaced):");
            println!("  version: V{}", version);
            println!("  alternate_path: {}", alternate_path.display());
            println!("  reason: {}", reason);
        }
    }
    println!("  content_digest: {}", outcome.content_digest);
    println!(
        "  markers: {} added, {} updated, {} deleted",
        outcome.markers.added, outcome.markers.updated, outcome.markers.deleted
    );

    let stats = &outcome.report.stats;
    println!(
        "  records: {} total, {} applied, {} skipped",
        stats.records_total, stats.records_applied, stats.records_skipped
    );
    for notice in &outcome.report.notices {
        let tag = if notice.is_warning() { "warning" } else { "note" };
        println!("  {}: {}", tag, notice);
    }
    Ok(())
}
