//! CLI definitions for gdrive-backup.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

/// gdrive-backup - Sync a single file to a Google Drive folder
#[derive(Parser, Debug)]
#[command(name = "gdrive-backup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the backup config file
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}
