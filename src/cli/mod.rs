//! Command line interface of QMS.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// QMS - hospital quality management toolkit.
#[derive(Parser, Debug)]
#[command(name = "qms")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "qms.toml")]
    pub config: PathBuf,

    /// Verbose mode.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Imports evaluation rows from a JSON array.
    Import {
        /// JSON file with evaluation rows.
        input: PathBuf,
    },

    /// Lists assessment sheet summaries, newest first.
    Summary {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Shows the rows and score breakdown of one sheet.
    Sheet {
        /// Sheet id.
        id: String,
    },

    /// Deletes every row of one sheet.
    DeleteSheet {
        /// Sheet id.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Shows the size of each lookup table.
    Lookups,

    /// Shows version.
    Version,
}
