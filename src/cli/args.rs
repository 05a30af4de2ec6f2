//! CLI argument definitions using clap
//!
//! Commands:
//! - weft check --config <path>
//! - weft update --config <path> --entity <name> [--loaded]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// weft - entity declarations compiled into document-store commands
#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the config and every entity declaration, then print a summary
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./weft.json")]
        config: PathBuf,
    },

    /// Read one entity document from stdin and print its update command
    Update {
        /// Path to configuration file
        #[arg(long, default_value = "./weft.json")]
        config: PathBuf,

        /// Declared entity name
        #[arg(long)]
        entity: String,

        /// Treat the input as a stored document (wire names, `_id` required)
        #[arg(long)]
        loaded: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
