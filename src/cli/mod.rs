//! CLI module for weft
//!
//! - check: load config and declarations, print an entity summary
//! - update: synthesize the update command for one entity document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run_command, update};
pub use errors::{CliError, CliResult};
pub use io::{read_document, read_request, write_error, write_response};

/// Parses arguments and runs the selected command. Failures are reported
/// as an error response on stdout before being returned.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match run_command(cli.command) {
        Ok(()) => Ok(()),
        Err(err) => {
            write_error(err.code(), &err.to_string())?;
            Err(err)
        }
    }
}
