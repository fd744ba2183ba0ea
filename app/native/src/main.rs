#![allow(clippy::multiple_crate_versions)]

//! Caravel - wallpaper rotation daemon and CLI.
//!
//! `caravel daemon` runs the rotation in the foreground. Every other
//! subcommand acts once on the shared settings and exits.

use caravel_lib::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(err) = caravel_lib::cli::run() {
        eprintln!("caravel: {err}");
        std::process::exit(1);
    }
}

/// Logs to stderr, filtered by `CARAVEL_LOG` (same syntax as `RUST_LOG`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
