//! List snapshot sheets

use crate::commands::print_table;
use clap::Args;
use redline_engine::commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct VersionsArgs {
    #[arg(long)]
    pub dest: PathBuf,
}

pub fn execute(args: VersionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let versions = match apply_engine_query(EngineQuery::ListVersions {
        workbook: args.dest,
    })? {
        EngineQueryResult::Versions(v) => v,
        EngineQueryResult::Snapshot(_) => return Err("unexpected query result".into()),
    };

    if versions.is_empty() {
        println!("No versions yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = versions
        .iter()
        .map(|v| {
            vec![
                v.sheet_name.clone(),
                v.row_count.to_string(),
                v.column_count.to_string(),
                v.created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                v.content_digest.chars().take(12).collect(),
            ]
        })
        .collect();
    print_table(&["Sheet", "Rows", "Columns", "Created", "Digest"], &rows);
    Ok(())
}
