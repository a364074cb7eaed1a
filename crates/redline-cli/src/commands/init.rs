//! Workbook creation
//!
//! Usage: redline init --dest <FILE> [--columns Log_ID,Status]

use clap::Args;
use redline_core::config::DEFAULT_CONFIG_FILE;
use redline_store::chain::traits::build_snapshot;
use redline_store::chain::{ChainOptions, SnapshotDraft};
use redline_store::source::load_config_or_default;
use redline_store::workbook::Workbook;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Workbook file to create; must not exist
    #[arg(long)]
    pub dest: PathBuf,

    /// Columns of an empty V1 sheet; the key column is added if missing
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Config file (defaults to ./redline.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn execute(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_or_default(args.config.as_deref(), Path::new("."))?;
    let mut workbook = Workbook::new();

    if !args.columns.is_empty() {
        let key = config.key_column();
        let mut columns: Vec<String> = Vec::new();
        if !args.columns.iter().any(|c| c.trim() == key) {
            columns.push(key.to_string());
        }
        for column in args.columns.iter().map(|c| c.trim()) {
            if !column.is_empty() && !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }

        let draft = SnapshotDraft {
            columns,
            rows: Vec::new(),
            cell_formats: Vec::new(),
        };
        let options = ChainOptions {
            default_column_width: config.audit.default_column_width,
        };
        workbook.append_snapshot(&build_snapshot(None, draft, 1, &options))?;
    }

    workbook.write_new(&args.dest)?;

    println!("Workbook created: {}", args.dest.display());
    match workbook.latest_snapshot() {
        Some(v1) => println!("  V1 columns: {}", v1.columns.join(", ")),
        None => println!("  empty chain (first apply creates V1)"),
    }
    if args.config.is_none() && !Path::new(DEFAULT_CONFIG_FILE).is_file() {
        println!("  using default config (key column {})", config.key_column());
    }
    Ok(())
}
