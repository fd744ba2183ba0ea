//! Error types for Caravel.
//!
//! [`CaravelError`] is what command handlers return. It flattens the module
//! errors into serializable messages for `--json` output.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::settings::SettingsError;
use crate::wallpaper::WallpaperManagerError;

/// Errors that can occur during command execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum CaravelError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Wallpaper operation failed.
    #[error("Wallpaper error: {0}")]
    WallpaperError(String),
    /// Catalog could not be read.
    #[error("Catalog error: {0}")]
    CatalogError(String),
    /// Settings could not be read or written.
    #[error("Settings error: {0}")]
    SettingsError(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for CaravelError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for CaravelError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<String> for CaravelError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for CaravelError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

impl From<ConfigError> for CaravelError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<CatalogError> for CaravelError {
    fn from(err: CatalogError) -> Self { Self::CatalogError(err.to_string()) }
}

impl From<SettingsError> for CaravelError {
    fn from(err: SettingsError) -> Self { Self::SettingsError(err.to_string()) }
}

impl From<WallpaperManagerError> for CaravelError {
    fn from(err: WallpaperManagerError) -> Self {
        match err {
            WallpaperManagerError::Catalog(err) => err.into(),
            WallpaperManagerError::Settings(err) => err.into(),
        }
    }
}
