//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod categories;
mod check;
mod export;
mod extract;
mod helpers;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use julius::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "julius")]
#[command(about = "Extract searchable text from municipal transparency PDFs")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root folder holding the id_<n> category folders (overrides config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// SQLite database file (overrides config file)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from pending PDFs and store it in the database
    Extract {
        /// Categories to process: page ids (8) or folder names (id_8).
        /// Processes every category folder if none are given.
        categories: Vec<String>,
        /// Skip the OCR fallback even when Tesseract is installed
        #[arg(long)]
        no_ocr: bool,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Check if the OCR tools (pdftoppm, pdfinfo, tesseract) are installed
    Check,

    /// List category folders with pending and processed document counts
    Categories,

    /// Show extraction result counts by status
    Status,

    /// Export stored extraction results as JSON
    Export {
        /// Output file
        output: PathBuf,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let no_ocr = matches!(cli.command, Commands::Extract { no_ocr: true, .. });
    let options = LoadOptions {
        config_path: cli.config,
        documents_dir: cli.root,
        database: cli.database,
        no_ocr,
    };
    let settings = load_settings(&options).await?;

    match cli.command {
        Commands::Extract {
            categories, quiet, ..
        } => extract::cmd_extract(&settings, &categories, !quiet).await,
        Commands::Check => check::cmd_check(&settings),
        Commands::Categories => categories::cmd_categories(&settings),
        Commands::Status => status::cmd_status(&settings),
        Commands::Export { output } => export::cmd_export(&settings, &output),
    }
}
