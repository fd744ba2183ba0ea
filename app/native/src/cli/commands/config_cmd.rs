//! Config CLI commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use colored::Colorize;

use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{LoadedConfig, config_paths};
use crate::error::CaravelError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Every option is written commented out, so the file starts out
    /// equivalent to the built-in defaults.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  caravel config init              # Create config at default location
  caravel config init --force      # Overwrite existing config
  caravel config init --path ~/my-config.jsonc  # Create at custom path
  caravel config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses the first search path.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show where Caravel looks for its configuration and settings.
    Path,
}

/// Execute config subcommands.
///
/// `loaded` is only used by `config path` to report the settings directory.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be created.
pub fn execute(cmd: &ConfigCommands, loaded: Option<&LoadedConfig>) -> Result<(), CaravelError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                Ok(())
            } else {
                init_config(*force, path.as_deref())
            }
        }
        ConfigCommands::Path => {
            show_config_path(loaded);
            Ok(())
        }
    }
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<&Path>) -> Result<(), CaravelError> {
    let config_path = custom_path.map_or_else(
        || config_paths().into_iter().next().unwrap_or_else(|| PathBuf::from("config.jsonc")),
        Path::to_path_buf,
    );

    if config_path.exists() && !force {
        return Err(CaravelError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        CaravelError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");

    Ok(())
}

/// Show the configuration file search paths and the settings directory.
fn show_config_path(loaded: Option<&LoadedConfig>) {
    println!("Configuration file search paths (in priority order):\n");

    let active = loaded.and_then(|l| l.path.as_deref());
    let mut found_config = false;

    for (i, path) in config_paths().iter().enumerate() {
        let marker = if active == Some(path.as_path()) {
            found_config = true;
            " (active)".green().to_string()
        } else if path.exists() {
            " (exists)".to_string()
        } else {
            String::new()
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if let Some(path) = active
        && !found_config
    {
        println!("\nUsing: {}", path.display());
    } else if active.is_none() {
        println!("\nNo configuration file found.");
        println!("Run 'caravel config init' to create one.");
    }

    if let Some(loaded) = loaded {
        println!("\nSettings directory: {}", loaded.store_dir().display());
    }
}
