//! Wallpaper CLI commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;

use super::types::CliOrderMode;
use crate::catalog::{self, FsDocumentSource, WallpaperRecord};
use crate::cli::output;
use crate::config::LoadedConfig;
use crate::constants::app_keys::CHANGE_LOCKSCREEN;
use crate::constants::{DELAY_MINUTES_MAX, DELAY_MINUTES_MIN};
use crate::error::CaravelError;
use crate::wallpaper::daemon::{self, DaemonOptions};
use crate::wallpaper::{self, Delay, OrderMode, WallpaperAction, WallpaperManager};

/// Wallpaper subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum WallpaperCommands {
    /// Run the rotation in the foreground.
    ///
    /// Changes the wallpaper every `delay` minutes and follows changes to the
    /// settings file. Stop it with Ctrl+C or from your service manager.
    Daemon,

    /// Switch to the next wallpaper now.
    Next {
        /// Print the applied record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the wallpaper that comes next.
    Preview {
        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the rotation state.
    Status {
        /// Print the state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the wallpapers in rotation order.
    List {
        /// Print the records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Set the rotation order.
    #[command(after_long_help = r#"Examples:
  caravel order shuffled     # Visit wallpapers in random order
  caravel order sequential   # Follow the catalog order"#)]
    Order {
        /// The order to use.
        #[arg(value_enum)]
        mode: CliOrderMode,
    },

    /// Show or set the minutes between wallpaper changes.
    Delay {
        /// New delay in minutes, from 1 to 1440.
        #[arg(value_name = "MINUTES", value_parser = parse_delay)]
        minutes: Option<Delay>,
    },

    /// Parse a catalog document and print its wallpaper entry.
    Inspect {
        /// Path to the catalog document.
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Rotation state reported by `caravel status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    catalog: PathBuf,
    count: usize,
    mode: OrderMode,
    delay: Delay,
    elapsed: u32,
    change_lockscreen: bool,
    current: Option<&'a WallpaperRecord>,
    next: Option<&'a WallpaperRecord>,
}

/// Execute wallpaper subcommands.
///
/// # Errors
///
/// Returns an error if the settings or catalog cannot be read, or a
/// settings write fails.
pub fn execute(
    cmd: &WallpaperCommands,
    loaded: &LoadedConfig,
    dry_run: bool,
) -> Result<(), CaravelError> {
    match cmd {
        WallpaperCommands::Daemon => execute_daemon(loaded, dry_run),
        WallpaperCommands::Next { json } => execute_next(loaded, dry_run, *json),
        WallpaperCommands::Preview { json } => execute_preview(loaded, dry_run, *json),
        WallpaperCommands::Status { json } => execute_status(loaded, dry_run, *json),
        WallpaperCommands::List { json } => execute_list(loaded, dry_run, *json),
        WallpaperCommands::Order { mode } => execute_order(loaded, dry_run, (*mode).into()),
        WallpaperCommands::Delay { minutes } => execute_delay(loaded, dry_run, *minutes),
        WallpaperCommands::Inspect { path, json } => execute_inspect(path, *json),
    }
}

/// Parses a delay argument.
fn parse_delay(value: &str) -> Result<Delay, String> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(Delay::new)
        .ok_or_else(|| {
            format!("delay must be a number of minutes from {DELAY_MINUTES_MIN} to {DELAY_MINUTES_MAX}")
        })
}

/// Opens the manager without reading the catalog.
fn open(loaded: &LoadedConfig, dry_run: bool) -> Result<WallpaperManager, CaravelError> {
    Ok(wallpaper::open_manager(loaded, dry_run)?.manager)
}

/// Opens the manager, reads the catalog and restores the stored position.
fn open_loaded(loaded: &LoadedConfig, dry_run: bool) -> Result<WallpaperManager, CaravelError> {
    let mut manager = open(loaded, dry_run)?;
    manager.reload()?;
    manager.resume_position();
    Ok(manager)
}

fn execute_daemon(loaded: &LoadedConfig, dry_run: bool) -> Result<(), CaravelError> {
    let opened = wallpaper::open_manager(loaded, dry_run)?;
    let options = DaemonOptions {
        tick_interval: loaded.config.tick_interval(),
        settings_file: (!dry_run).then_some(opened.settings_file),
    };

    daemon::run(opened.manager, options);
    Ok(())
}

fn execute_next(loaded: &LoadedConfig, dry_run: bool, json: bool) -> Result<(), CaravelError> {
    let mut manager = open_loaded(loaded, dry_run)?;

    let Some(record) = manager.skip()? else {
        return Err(CaravelError::WallpaperError(format!(
            "Not enough wallpapers to rotate: {} found in {}",
            manager.entries().len(),
            manager.background_dir().display()
        )));
    };

    if json {
        output::print_json(&record)?;
    } else {
        let suffix = if dry_run { " (dry run)".dimmed().to_string() } else { String::new() };
        println!("{} {}{suffix}", "Applied".green().bold(), record.display_name());
    }
    Ok(())
}

fn execute_preview(loaded: &LoadedConfig, dry_run: bool, json: bool) -> Result<(), CaravelError> {
    let manager = open_loaded(loaded, dry_run)?;
    let preview = manager.preview();

    if json {
        return output::print_json(&preview);
    }

    match preview {
        Some(record) => output::print_record(record),
        None => println!("No wallpapers found in {}", manager.background_dir().display()),
    }
    Ok(())
}

fn execute_status(loaded: &LoadedConfig, dry_run: bool, json: bool) -> Result<(), CaravelError> {
    let manager = open_loaded(loaded, dry_run)?;

    let report = StatusReport {
        catalog: manager.background_dir(),
        count: manager.entries().len(),
        mode: manager.mode(),
        delay: manager.timer().delay(),
        elapsed: manager.timer().elapsed(),
        change_lockscreen: manager
            .stores()
            .application
            .get_bool(CHANGE_LOCKSCREEN)
            .unwrap_or(false),
        current: manager.current(),
        next: manager.preview(),
    };

    if json {
        return output::print_json(&report);
    }

    let name = |record: Option<&WallpaperRecord>| {
        output::optional(record.map(WallpaperRecord::display_name).as_deref())
    };

    println!("{:>11}  {} ({} wallpapers)", "Catalog".bold(), report.catalog.display(), report.count);
    println!("{:>11}  {}", "Order".bold(), report.mode);
    println!(
        "{:>11}  {} ({} elapsed, next change in {} min)",
        "Delay".bold(),
        report.delay,
        report.elapsed,
        manager.timer().remaining()
    );
    println!("{:>11}  {}", "Lock screen".bold(), output::format_bool(report.change_lockscreen));
    println!("{:>11}  {}", "Current".bold(), name(report.current));
    println!("{:>11}  {}", "Next".bold(), name(report.next));
    Ok(())
}

fn execute_list(loaded: &LoadedConfig, dry_run: bool, json: bool) -> Result<(), CaravelError> {
    let manager = open_loaded(loaded, dry_run)?;

    if json {
        return output::print_json(&manager.entries());
    }

    if manager.entries().is_empty() {
        println!("No wallpapers found in {}", manager.background_dir().display());
        return Ok(());
    }

    output::print_record_table(manager.entries(), manager.queue().current_index());
    Ok(())
}

fn execute_order(loaded: &LoadedConfig, dry_run: bool, mode: OrderMode) -> Result<(), CaravelError> {
    let mut manager = open(loaded, dry_run)?;
    manager.perform_action(WallpaperAction::SetMode(mode))?;
    println!("Order set to {}", mode.to_string().bold());
    Ok(())
}

fn execute_delay(
    loaded: &LoadedConfig,
    dry_run: bool,
    minutes: Option<Delay>,
) -> Result<(), CaravelError> {
    let mut manager = open(loaded, dry_run)?;

    match minutes {
        Some(delay) => {
            manager.perform_action(WallpaperAction::SetDelay(delay))?;
            println!("Delay set to {}", delay.to_string().bold());
        }
        None => println!("{}", manager.delay()),
    }
    Ok(())
}

fn execute_inspect(path: &Path, json: bool) -> Result<(), CaravelError> {
    let record = catalog::load_document(&FsDocumentSource, path)?.ok_or_else(|| {
        CaravelError::InvalidArguments(format!("No wallpaper entry found in {}", path.display()))
    })?;

    if json {
        output::print_json(&record)
    } else {
        output::print_record(&record);
        Ok(())
    }
}
