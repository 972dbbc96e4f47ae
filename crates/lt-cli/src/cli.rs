//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Swim meet lane timing tools.
///
/// Reads start lists and results from timing system files, resolves final
/// times from redundant watch readings, and converts between formats.
#[derive(Debug, Parser)]
#[command(name = "lt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the contents of a results or start list file.
    Inspect {
        /// The file to decode.
        file: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resolve final times and places for a results file.
    Resolve {
        /// The results file.
        results: PathBuf,

        /// Directory of start lists to take swimmer names from.
        #[arg(long)]
        start_list: Option<PathBuf>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rewrite a results file in another timing system's format.
    Convert {
        /// The results file to read.
        input: PathBuf,

        /// Target format (do4, csv or generic).
        #[arg(long)]
        to: String,

        /// Directory to write into; defaults to the input's directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Build the event list for the Dolphin software from a start list directory.
    Program {
        /// Directory holding the `*.scb` start lists.
        start_list_dir: PathBuf,

        /// Write the CSV here instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
