//! Configuration module for Caravel.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//! A missing file is not an error: built-in defaults are used.

pub mod template;
pub mod types;

use std::path::{Path, PathBuf};

pub use types::{
    CaravelConfig, ConfigError, SettingsDefaults, StoreBackend, config_paths,
    load_config as load_config_default, load_config_from_path,
};

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: CaravelConfig,
    /// `None` when no file was found and defaults are in use.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory of the loaded configuration file.
    #[must_use]
    pub fn config_dir(&self) -> Option<&Path> { self.path.as_deref().and_then(Path::parent) }

    /// Directory holding Caravel's settings files.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf { self.config.store_dir(self.config_dir()) }
}

/// Loads the configuration.
///
/// With `custom_path` (the `--config` flag) that file must exist and parse.
/// Otherwise the default locations are searched; a missing or broken file
/// falls back to defaults with a log message.
///
/// # Errors
///
/// Returns an error only for a custom path that cannot be loaded.
pub fn load(custom_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = custom_path {
        let (config, path) = load_config_from_path(path)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        return Ok(LoadedConfig { config, path: Some(path) });
    }

    match load_config_default() {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(LoadedConfig { config, path: Some(path) })
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(LoadedConfig::default())
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            Ok(LoadedConfig::default())
        }
    }
}
