//! Configuration types for Caravel.
//!
//! The configuration file chooses the settings backend and seeds the
//! application settings with defaults. Everything the user changes at run
//! time (delay, order, catalog directory) lives in the settings store, not
//! here.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{BACKGROUND_PROPERTIES_DEFAULT, DELAY_MINUTES_DEFAULT};
use crate::platform::path::{expand, expand_and_resolve};

/// Where the desktop background and interface settings are read and written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The desktop's own settings, through the `gsettings` tool.
    #[default]
    Gsettings,
    /// JSON files under `storePath`. Does not change the real desktop.
    File,
}

/// Initial values for Caravel's own settings.
///
/// These apply until a value is written to the settings store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsDefaults {
    /// Directory containing the wallpaper catalog documents.
    pub background_properties_path: String,

    /// Minutes between wallpaper changes, from 1 to 1440.
    pub delay: u32,

    /// Visit the catalog in shuffled order instead of listing order.
    pub random: bool,

    /// Also set the lock screen background.
    pub change_lockscreen: bool,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            background_properties_path: BACKGROUND_PROPERTIES_DEFAULT.to_string(),
            delay: DELAY_MINUTES_DEFAULT,
            random: false,
            change_lockscreen: false,
        }
    }
}

/// Root configuration structure for Caravel.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CaravelConfig {
    /// Settings backend for the desktop namespaces: "gsettings" or "file".
    ///
    /// Caravel's own settings are always kept in `storePath`.
    pub backend: StoreBackend,

    /// Directory holding Caravel's settings files.
    ///
    /// Relative paths are resolved against the configuration file directory.
    /// Supports `~`. Empty means the user data directory (for example
    /// `~/.local/share/caravel`).
    pub store_path: String,

    /// Seconds per timer tick in the daemon. One tick counts one minute of
    /// the rotation delay; lower it only for testing.
    pub tick_seconds: u64,

    /// Give the lock screen the dark variant while the desktop is in dark
    /// mode. When off, the lock screen always gets the light variant.
    pub lockscreen_dark_variant: bool,

    /// Defaults for Caravel's own settings.
    pub defaults: SettingsDefaults,
}

impl Default for CaravelConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            store_path: String::new(),
            tick_seconds: 60,
            lockscreen_dark_variant: true,
            defaults: SettingsDefaults::default(),
        }
    }
}

impl CaravelConfig {
    /// Resolves the settings directory.
    ///
    /// `config_dir` is the directory of the loaded configuration file, used
    /// for relative paths. Without one, relative paths are kept as they are.
    #[must_use]
    pub fn store_dir(&self, config_dir: Option<&Path>) -> PathBuf {
        if self.store_path.trim().is_empty() {
            return dirs::data_dir()
                .map_or_else(|| expand("~/.local/share/caravel"), |dir| dir.join("caravel"));
        }

        config_dir.map_or_else(
            || expand(&self.store_path),
            |base| expand_and_resolve(&self.store_path, base),
        )
    }

    /// Tick interval with a floor of one second.
    #[must_use]
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_seconds.max(1))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/caravel/config.jsonc \
                or ~/.caravel.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".caravel.jsonc", ".caravel.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/caravel/` when the variable is set
/// 2. `~/.config/caravel/`
/// 3. The platform configuration directory, when different
/// 4. `~/.caravel.jsonc` and `~/.caravel.json`
///
/// Each directory is searched for `config.jsonc` then `config.json`.
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let caravel_dir = PathBuf::from(xdg_config).join("caravel");
        for filename in CONFIG_FILE_NAMES {
            paths.push(caravel_dir.join(filename));
        }
    }

    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join("caravel"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join("caravel"));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// The file may contain `//` and `/* */` comments.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or an
/// I/O or parse error for the first file found.
pub fn load_config() -> Result<(CaravelConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, or an I/O or
/// parse error.
pub fn load_config_from_path(path: &Path) -> Result<(CaravelConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: CaravelConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
