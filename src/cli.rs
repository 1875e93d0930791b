//! Command-line interface implementation for Otter.
//! Provides argument parsing and help text using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for Otter.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Otter: compose reusable layers into your project",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the current directory for otter
    Init,
    /// Build the environment by applying the configured layers
    Build {
        /// Configuration file to use (default: auto-detect Otterfile/Envfile)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

/// Parses command line arguments and returns the Cli structure.
pub fn get_args() -> Cli {
    Cli::parse()
}
