//! CLI command definitions using Clap.
//!
//! - `config_cmd` - Configuration file commands
//! - `types` - Shared argument types
//! - `wallpaper` - Rotation commands, exposed at the top level

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::CaravelError;
use crate::{config, schema};

pub mod config_cmd;
pub mod types;
pub mod wallpaper;

pub use config_cmd::ConfigCommands;
pub use wallpaper::WallpaperCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Caravel - rotates desktop wallpapers from GNOME background catalogs.
#[derive(Parser, Debug)]
#[command(name = "caravel")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Compute changes without writing any settings.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    #[command(flatten)]
    Wallpaper(WallpaperCommands),

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output Caravel configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(caravel completions --shell zsh)"
    ///   caravel completions --shell bash > ~/.local/share/bash-completion/completions/caravel
    ///   caravel completions --shell fish > ~/.config/fish/completions/caravel.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the command
    /// fails.
    pub fn execute(&self) -> Result<(), CaravelError> {
        match &self.command {
            Commands::Wallpaper(cmd) => {
                let loaded = config::load(self.config.as_deref())?;
                wallpaper::execute(cmd, &loaded, self.dry_run)
            }

            Commands::Config(cmd) => {
                let loaded = match cmd {
                    ConfigCommands::Path => config::load(self.config.as_deref()).ok(),
                    ConfigCommands::Init { .. } => None,
                };
                config_cmd::execute(cmd, loaded.as_ref())
            }

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "caravel", &mut io::stdout());
    }
}
