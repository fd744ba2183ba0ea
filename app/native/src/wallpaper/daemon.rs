//! Event loop running the wallpaper rotation.
//!
//! Timer ticks, settings file changes and key change notifications all
//! arrive on one channel and are handled in order on the calling thread, so
//! the manager is never shared.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use super::manager::{WallpaperManager, WallpaperManagerError};
use crate::settings::watcher::watch_file;

/// Something the daemon has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    /// One minute of the rotation delay has passed.
    Tick,
    /// The settings file was modified on disk.
    SettingsFileChanged,
    /// An application key changed.
    SettingChanged(String),
}

/// Daemon parameters.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    /// Wall-clock duration of one tick.
    pub tick_interval: Duration,
    /// Settings file to watch for external edits, if any.
    pub settings_file: Option<PathBuf>,
}

/// Runs the rotation until the process is stopped.
///
/// Loads the catalog, resumes at the stored position and then processes
/// events forever. Errors while handling an event are logged and do not stop
/// the loop.
pub fn run(mut manager: WallpaperManager, options: DaemonOptions) {
    let (tx, rx) = mpsc::channel();

    let changes = tx.clone();
    manager.watch_settings(move |key: &str| {
        let _ = changes.send(ManagerEvent::SettingChanged(key.to_string()));
    });

    match manager.reload() {
        Ok(0) => tracing::warn!(dir = %manager.background_dir().display(), "catalog is empty"),
        Ok(_) => {}
        Err(err) => tracing::error!(error = %err, "failed to load catalog"),
    }
    manager.resume_position();

    manager.set_preview_listener(Box::new(|record| {
        if let Some(record) = record {
            tracing::debug!(next = %record.display_name(), "upcoming wallpaper");
        }
    }));

    spawn_ticker(tx.clone(), options.tick_interval);

    if let Some(path) = options.settings_file {
        let files = tx.clone();
        watch_file(path, move || files.send(ManagerEvent::SettingsFileChanged).is_ok());
    }
    drop(tx);

    tracing::info!(
        delay = manager.timer().delay().minutes(),
        elapsed = manager.timer().elapsed(),
        mode = %manager.mode(),
        "wallpaper daemon started"
    );

    for event in rx {
        if let Err(err) = handle_event(&mut manager, &event) {
            tracing::error!(error = %err, ?event, "failed to handle event");
        }
    }

    tracing::info!("wallpaper daemon stopped");
}

/// Applies one event to the manager.
///
/// # Errors
///
/// Returns whatever the manager operation returned.
pub fn handle_event(
    manager: &mut WallpaperManager,
    event: &ManagerEvent,
) -> Result<(), WallpaperManagerError> {
    match event {
        ManagerEvent::Tick => {
            manager.tick()?;
        }
        ManagerEvent::SettingsFileChanged => {
            let changed = manager.refresh_settings()?;
            if !changed.is_empty() {
                tracing::debug!(?changed, "settings changed on disk");
            }
        }
        ManagerEvent::SettingChanged(key) => manager.handle_setting_changed(key)?,
    }
    Ok(())
}

/// Sends a tick every `interval` until the receiver is gone.
fn spawn_ticker(tx: Sender<ManagerEvent>, interval: Duration) {
    std::thread::spawn(move || {
        loop {
            std::thread::sleep(interval);
            if tx.send(ManagerEvent::Tick).is_err() {
                break;
            }
        }
    });
}
