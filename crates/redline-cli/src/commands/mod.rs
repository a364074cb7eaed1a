pub mod apply;
pub mod init;
pub mod preview;
pub mod show;
pub mod versions;

use clap::ValueEnum;
use redline_core::config::{ExtractionMode, RedlineConfig};
use redline_store::source::load_config_or_default;
use std::path::Path;

/// `--mode` values
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Row,
    Cell,
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Row => ExtractionMode::Row,
            ModeArg::Cell => ExtractionMode::Cell,
        }
    }
}

/// Config from `--config`, else `./redline.toml`, else defaults, with the
/// `--mode` override applied
pub fn resolve_config(
    explicit: Option<&Path>,
    mode: Option<ModeArg>,
) -> Result<RedlineConfig, Box<dyn std::error::Error>> {
    let mut config = load_config_or_default(explicit, Path::new("."))?;
    if let Some(mode) = mode {
        config.mode = mode.into();
    }
    Ok(config)
}

/// Print rows as a `|`-separated table, padding each column to its widest
/// cell
pub fn print_table(header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(header.to_vec()));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
