//! Command-line interface for Caravel.
//!
//! Every command runs against the settings stores directly; `caravel daemon`
//! is the long-running process and other invocations act on the shared
//! settings it watches.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::CaravelError;

/// Runs the CLI.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), CaravelError> {
    let cli = Cli::parse();
    cli.execute()
}
