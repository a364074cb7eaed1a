//! Print a snapshot
//!
//! Marked cells are suffixed `[+]` (added), `[~]` (updated) or `[-]`
//! (deleted).

use crate::commands::print_table;
use clap::Args;
use redline_core::errors::ExError;
use redline_core::model::{Marker, Snapshot};
use redline_engine::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
use redline_store::workbook::validate_snapshot_name;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long)]
    pub dest: PathBuf,

    /// Version to print, as `2` or `V2` (defaults to the latest)
    #[arg(long)]
    pub version: Option<String>,
}

fn parse_version(arg: &str) -> Result<u32, Box<dyn std::error::Error>> {
    let arg = arg.trim();
    match arg.parse::<u32>() {
        Ok(v) => Ok(v),
        Err(_) => Ok(validate_snapshot_name(arg).map_err(ExError::from)?),
    }
}

fn marker_suffix(marker: Marker) -> &'static str {
    match marker {
        Marker::Added => " [+]",
        Marker::Updated => " [~]",
        Marker::Deleted => " [-]",
    }
}

pub fn execute(args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let version = args.version.as_deref().map(parse_version).transpose()?;
    let snapshot = match apply_engine_query(EngineQuery::GetSnapshot {
        workbook: args.dest,
        version,
    })? {
        EngineQueryResult::Snapshot(s) => s,
        EngineQueryResult::Versions(_) => return Err("unexpected query result".into()),
    };

    println!("{} ({} rows)", snapshot.name(), snapshot.rows.len());
    let rows: Vec<Vec<String>> = snapshot
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let formats = snapshot.cell_formats.get(i);
            snapshot
                .columns
                .iter()
                .map(|c| {
                    let marker = formats
                        .and_then(|f| f.get(c))
                        .and_then(|f| f.marker)
                        .map_or("", marker_suffix);
                    format!("{}{}", Snapshot::cell(row, c), marker)
                })
                .collect()
        })
        .collect();
    let header: Vec<&str> = snapshot.columns.iter().map(String::as_str).collect();
    print_table(&header, &rows);
    Ok(())
}
