//! File watcher for externally edited settings.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Editors and atomic renames emit several events per save.
const SETTINGS_DEBOUNCE_MS: u64 = 200;

/// Calls `on_change` from a background thread whenever `path` is modified.
///
/// The parent directory is watched so that files replaced by rename are
/// still seen. Events within the debounce window of the previous one are
/// dropped. The thread ends when `on_change` returns `false`.
pub fn watch_file<F>(path: PathBuf, mut on_change: F)
where
    F: FnMut() -> bool + Send + 'static,
{
    let Some(file_name) = path.file_name().map(std::ffi::OsStr::to_os_string) else {
        tracing::warn!(path = %path.display(), "settings watcher needs a file path");
        return;
    };
    let watch_dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    std::thread::spawn(move || {
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create settings watcher");
                return;
            }
        };

        if let Err(err) = std::fs::create_dir_all(&watch_dir) {
            tracing::warn!(error = %err, dir = %watch_dir.display(), "failed to create settings directory");
            return;
        }

        if let Err(err) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %err, dir = %watch_dir.display(), "failed to watch settings directory");
            return;
        }

        tracing::debug!(path = %path.display(), "watching settings file");

        let mut last_event_time: Option<Instant> = None;
        let debounce_duration = Duration::from_millis(SETTINGS_DEBOUNCE_MS);

        loop {
            match rx.recv() {
                Ok(Ok(event)) => {
                    if !affects(&event.paths, &file_name) {
                        continue;
                    }

                    let now = Instant::now();
                    if last_event_time.is_some_and(|t| now.duration_since(t) < debounce_duration) {
                        continue;
                    }
                    last_event_time = Some(now);

                    if !on_change() {
                        break;
                    }
                }
                Ok(Err(err)) => tracing::warn!(error = %err, "settings watch error"),
                Err(_) => break,
            }
        }
    });
}

fn affects(paths: &[PathBuf], file_name: &OsString) -> bool {
    paths.iter().any(|p| p.file_name().is_some_and(|name| name == file_name.as_os_str()))
}
