//! Redline CLI
//!
//! Command-line interface for the versioned change tracker

use clap::{Parser, Subcommand};
use redline_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "redline")]
#[command(about = "Redline - highlight-driven versioned change tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new workbook
    Init(commands::init::InitArgs),
    /// Show the changes a source would produce, without writing anything
    Preview(commands::preview::PreviewArgs),
    /// Merge a source into a workbook as a new version
    Apply(commands::apply::ApplyArgs),
    /// List the snapshot sheets of a workbook
    Versions(commands::versions::VersionsArgs),
    /// Print one snapshot as a table
    Show(commands::show::ShowArgs),
}

fn main() {
    logging_facility::init(Profile::Development);
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args),
        Commands::Preview(args) => commands::preview::execute(args),
        Commands::Apply(args) => commands::apply::execute(args),
        Commands::Versions(args) => commands::versions::execute(args),
        Commands::Show(args) => commands::show::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
