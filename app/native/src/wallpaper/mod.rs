//! Wallpaper rotation.
//!
//! - [`queue`] - Rotation order and shuffling
//! - [`timer`] - Minute-based rotation timer
//! - [`manager`] - State owner applying wallpapers to the settings
//! - [`daemon`] - Event loop driving the manager

pub mod daemon;
pub mod manager;
pub mod queue;
pub mod timer;

use std::path::PathBuf;

pub use manager::{
    PreviewListener, SettingsStores, WallpaperAction, WallpaperManager, WallpaperManagerError,
};
pub use queue::{OrderMode, RotationQueue, fisher_yates};
pub use timer::{Delay, RotationTimer};

use crate::catalog::FsDocumentSource;
use crate::config::{LoadedConfig, StoreBackend};
use crate::constants::app_keys::{
    BACKGROUND_PROPERTIES_PATH, CHANGE_LOCKSCREEN, DELAY, ELAPSED_TIME, RANDOM,
};
use crate::constants::{APP_SCHEMA, BACKGROUND_SCHEMA, INTERFACE_SCHEMA, SCREENSAVER_SCHEMA};
use crate::settings::{
    Appearance, ColorSchemeAppearance, FileStore, GSettingsStore, MemoryStore, SettingValue,
    SettingsError, SettingsStore,
};

/// A manager built from configuration, with the path of its settings file.
pub struct OpenedManager {
    pub manager: WallpaperManager,
    /// File backing the application settings, watched by the daemon.
    pub settings_file: PathBuf,
}

/// Builds a manager from the loaded configuration.
///
/// Caravel's own settings always live in a [`FileStore`] under the store
/// directory, seeded with the configured defaults. The desktop namespaces
/// use the configured backend. With `dry_run`, nothing is written: the
/// application store is detached and the desktop namespaces are replaced by
/// in-memory stores.
///
/// # Errors
///
/// Returns an error if a settings file cannot be read or `gsettings` is
/// required but missing.
pub fn open_manager(
    loaded: &LoadedConfig,
    dry_run: bool,
) -> Result<OpenedManager, WallpaperManagerError> {
    let config = &loaded.config;
    let store_dir = loaded.store_dir();

    let mut application = FileStore::open(&store_dir, APP_SCHEMA)?.with_defaults(app_defaults(loaded));
    if dry_run {
        application = application.detach();
    }
    let settings_file = application.path().to_path_buf();

    let (background, screensaver) = if dry_run {
        (
            Box::new(MemoryStore::new(BACKGROUND_SCHEMA)) as Box<dyn SettingsStore>,
            Box::new(MemoryStore::new(SCREENSAVER_SCHEMA)) as Box<dyn SettingsStore>,
        )
    } else {
        (
            desktop_store(config.backend, &store_dir, BACKGROUND_SCHEMA)?,
            desktop_store(config.backend, &store_dir, SCREENSAVER_SCHEMA)?,
        )
    };

    let appearance: Box<dyn Appearance> = Box::new(ColorSchemeAppearance::new(desktop_store(
        config.backend,
        &store_dir,
        INTERFACE_SCHEMA,
    )?));

    let stores = SettingsStores {
        application: Box::new(application),
        background,
        screensaver,
    };

    tracing::debug!(
        backend = ?config.backend,
        store_dir = %store_dir.display(),
        dry_run,
        "opening wallpaper manager"
    );

    let manager = WallpaperManager::new(Box::new(FsDocumentSource), stores, appearance)
        .with_lockscreen_dark_aware(config.lockscreen_dark_variant);

    Ok(OpenedManager { manager, settings_file })
}

fn desktop_store(
    backend: StoreBackend,
    store_dir: &std::path::Path,
    schema: &str,
) -> Result<Box<dyn SettingsStore>, SettingsError> {
    Ok(match backend {
        StoreBackend::Gsettings => Box::new(GSettingsStore::new(schema)?),
        StoreBackend::File => Box::new(FileStore::open(store_dir, schema)?),
    })
}

fn app_defaults(loaded: &LoadedConfig) -> Vec<(&'static str, SettingValue)> {
    let defaults = &loaded.config.defaults;
    let background_dir = loaded.config_dir().map_or_else(
        || crate::platform::expand(&defaults.background_properties_path),
        |base| crate::platform::expand_and_resolve(&defaults.background_properties_path, base),
    );

    vec![
        (BACKGROUND_PROPERTIES_PATH, SettingValue::Str(background_dir.to_string_lossy().into_owned())),
        (DELAY, SettingValue::Int(i32::try_from(defaults.delay).unwrap_or(i32::MAX))),
        (RANDOM, SettingValue::Bool(defaults.random)),
        (CHANGE_LOCKSCREEN, SettingValue::Bool(defaults.change_lockscreen)),
        (ELAPSED_TIME, SettingValue::Int(0)),
    ]
}
