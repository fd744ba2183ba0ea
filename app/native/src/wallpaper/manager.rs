//! Wallpaper manager tying the catalog, rotation queue and settings together.

use std::path::{Path, PathBuf};

use super::queue::{OrderMode, RotationQueue};
use super::timer::{Delay, RotationTimer};
use crate::catalog::{self, CatalogError, DocumentSource, WallpaperRecord};
use crate::constants::BACKGROUND_PROPERTIES_DEFAULT;
use crate::constants::app_keys::{
    BACKGROUND_PROPERTIES_PATH, CHANGE_LOCKSCREEN, CURRENT_WALLPAPER, DELAY, ELAPSED_TIME, RANDOM,
};
use crate::platform::path::expand;
use crate::settings::{
    Appearance, ApplyOptions, SettingValue, SettingsError, SettingsStore, SettingsSync,
};

/// Application keys whose changes the manager reacts to.
pub const WATCHED_KEYS: &[&str] =
    &[BACKGROUND_PROPERTIES_PATH, RANDOM, DELAY, CHANGE_LOCKSCREEN, CURRENT_WALLPAPER];

/// Actions that can be requested from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallpaperAction {
    /// Switch to the next wallpaper and restart the timer.
    Next,
    /// Change the order mode.
    SetMode(OrderMode),
    /// Change the rotation delay.
    SetDelay(Delay),
}

/// Errors that can occur in wallpaper management.
#[derive(Debug)]
pub enum WallpaperManagerError {
    /// The catalog could not be loaded.
    Catalog(CatalogError),
    /// A settings read, write or sync failed.
    Settings(SettingsError),
}

impl std::fmt::Display for WallpaperManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "Catalog error: {err}"),
            Self::Settings(err) => write!(f, "Settings error: {err}"),
        }
    }
}

impl std::error::Error for WallpaperManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Settings(err) => Some(err),
        }
    }
}

impl From<CatalogError> for WallpaperManagerError {
    fn from(err: CatalogError) -> Self { Self::Catalog(err) }
}

impl From<SettingsError> for WallpaperManagerError {
    fn from(err: SettingsError) -> Self { Self::Settings(err) }
}

/// The settings namespaces the manager reads and writes.
pub struct SettingsStores {
    /// Caravel's own namespace.
    pub application: Box<dyn SettingsStore>,
    /// Desktop background namespace.
    pub background: Box<dyn SettingsStore>,
    /// Lock screen background namespace.
    pub screensaver: Box<dyn SettingsStore>,
}

/// Called with the upcoming wallpaper whenever it may have changed.
pub type PreviewListener = Box<dyn FnMut(Option<&WallpaperRecord>)>;

/// Owns the rotation state and applies wallpapers.
///
/// All state lives in this value; there are no globals. The daemon drives it
/// from a single thread, the CLI creates one per invocation.
pub struct WallpaperManager {
    source: Box<dyn DocumentSource>,
    stores: SettingsStores,
    appearance: Box<dyn Appearance>,
    queue: RotationQueue,
    timer: RotationTimer,
    lockscreen_dark_aware: bool,
    preview_listener: Option<PreviewListener>,
}

impl WallpaperManager {
    /// Creates a manager from the stored application settings.
    ///
    /// An out-of-range stored delay is replaced by the default. The catalog
    /// is not read until [`WallpaperManager::reload`].
    #[must_use]
    pub fn new(
        source: Box<dyn DocumentSource>,
        mut stores: SettingsStores,
        appearance: Box<dyn Appearance>,
    ) -> Self {
        let mode = OrderMode::from_random(stores.application.get_bool(RANDOM).unwrap_or(false));
        let delay = read_delay(stores.application.as_mut());
        let elapsed = stores
            .application
            .get_int(ELAPSED_TIME)
            .and_then(|minutes| u32::try_from(minutes).ok())
            .unwrap_or(0);

        Self {
            source,
            stores,
            appearance,
            queue: RotationQueue::new(mode),
            timer: RotationTimer::new(delay, elapsed),
            lockscreen_dark_aware: true,
            preview_listener: None,
        }
    }

    /// Uses a deterministic shuffle sequence.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.queue = RotationQueue::with_seed(self.queue.mode(), seed);
        self
    }

    /// Whether the lock screen follows dark mode. On by default.
    #[must_use]
    pub fn with_lockscreen_dark_aware(mut self, enabled: bool) -> Self {
        self.lockscreen_dark_aware = enabled;
        self
    }

    /// The catalog directory from the settings, with a leading tilde expanded.
    #[must_use]
    pub fn background_dir(&self) -> PathBuf {
        let configured = self
            .stores
            .application
            .get_string(BACKGROUND_PROPERTIES_PATH)
            .filter(|path| !path.trim().is_empty());

        expand(configured.as_deref().unwrap_or(BACKGROUND_PROPERTIES_DEFAULT))
    }

    /// Reads the catalog into the queue, rewinding to the first entry.
    ///
    /// Returns the number of wallpapers found.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog directory cannot be listed.
    pub fn reload(&mut self) -> Result<usize, WallpaperManagerError> {
        let dir = self.background_dir();
        let records = catalog::load_catalog(self.source.as_ref(), &dir)?;
        let count = records.len();

        self.queue.load(records);
        tracing::info!(dir = %dir.display(), count, mode = %self.queue.mode(), "catalog loaded");

        self.notify_preview();
        Ok(count)
    }

    /// Moves the queue to the wallpaper recorded as current in the settings.
    ///
    /// Returns `false` if nothing is recorded or it is no longer in the queue.
    pub fn resume_position(&mut self) -> bool {
        let Some(current) = self.stores.application.get_string(CURRENT_WALLPAPER) else {
            return false;
        };

        let found = self.queue.seek(Path::new(&current));
        if found {
            tracing::debug!(current = %current, index = self.queue.current_index(), "resumed position");
            self.notify_preview();
        }
        found
    }

    /// Advances the queue and applies the new wallpaper.
    ///
    /// Returns `None` without touching the settings when the queue has fewer
    /// than two entries.
    ///
    /// # Errors
    ///
    /// Returns the first failed settings write. The queue has advanced and
    /// earlier writes are kept.
    pub fn next(&mut self) -> Result<Option<WallpaperRecord>, WallpaperManagerError> {
        let options = self.apply_options();

        let Some(record) = self.queue.next().cloned() else {
            tracing::debug!(count = self.queue.len(), "not enough wallpapers to rotate");
            return Ok(None);
        };

        let applied = SettingsSync::new(
            self.stores.background.as_mut(),
            self.stores.screensaver.as_mut(),
            self.stores.application.as_mut(),
        )
        .apply(&record, options);

        self.notify_preview();
        applied?;
        Ok(Some(record))
    }

    /// Switches to the next wallpaper now and restarts the timer.
    ///
    /// # Errors
    ///
    /// See [`WallpaperManager::next`].
    pub fn skip(&mut self) -> Result<Option<WallpaperRecord>, WallpaperManagerError> {
        let record = self.next()?;
        self.timer.restart();
        self.persist_elapsed()?;
        Ok(record)
    }

    /// Counts one minute, rotating when the delay is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if rotating or saving the elapsed time fails.
    pub fn tick(&mut self) -> Result<Option<WallpaperRecord>, WallpaperManagerError> {
        if !self.timer.is_running() {
            return Ok(None);
        }

        let rotated = if self.timer.tick() { self.next()? } else { None };
        self.persist_elapsed()?;
        Ok(rotated)
    }

    /// The upcoming wallpaper.
    #[must_use]
    pub fn preview(&self) -> Option<&WallpaperRecord> { self.queue.preview() }

    /// The wallpaper at the current position.
    #[must_use]
    pub fn current(&self) -> Option<&WallpaperRecord> { self.queue.current() }

    /// Queue entries in rotation order.
    #[must_use]
    pub fn entries(&self) -> &[WallpaperRecord] { self.queue.entries() }

    #[must_use]
    pub const fn queue(&self) -> &RotationQueue { &self.queue }

    #[must_use]
    pub const fn timer(&self) -> &RotationTimer { &self.timer }

    #[must_use]
    pub const fn stores(&self) -> &SettingsStores { &self.stores }

    #[must_use]
    pub const fn mode(&self) -> OrderMode { self.queue.mode() }

    /// Changes and stores the order mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the `random` key cannot be written.
    pub fn set_mode(&mut self, mode: OrderMode) -> Result<(), WallpaperManagerError> {
        let app = self.stores.application.as_mut();
        if app.get_bool(RANDOM) != Some(mode.is_random()) {
            app.write(RANDOM, SettingValue::Bool(mode.is_random()))?;
            app.sync()?;
        }

        self.apply_mode(mode);
        Ok(())
    }

    /// The stored delay. An out-of-range value is replaced by the default.
    pub fn delay(&mut self) -> Delay { read_delay(self.stores.application.as_mut()) }

    /// Changes and stores the rotation delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the `delay` key cannot be written.
    pub fn set_delay(&mut self, delay: Delay) -> Result<(), WallpaperManagerError> {
        let app = self.stores.application.as_mut();
        app.write(DELAY, delay.into())?;
        app.sync()?;

        self.timer.set_delay(delay);
        tracing::info!(delay = delay.minutes(), "rotation delay changed");
        Ok(())
    }

    /// Stops or restarts counting minutes.
    pub const fn set_paused(&mut self, paused: bool) {
        if paused {
            self.timer.pause();
        } else {
            self.timer.resume();
        }
    }

    /// Performs a command line action.
    ///
    /// # Errors
    ///
    /// Returns an error if the action's settings write fails.
    pub fn perform_action(&mut self, action: WallpaperAction) -> Result<(), WallpaperManagerError> {
        match action {
            WallpaperAction::Next => self.skip().map(|_| ()),
            WallpaperAction::SetMode(mode) => self.set_mode(mode),
            WallpaperAction::SetDelay(delay) => self.set_delay(delay),
        }
    }

    /// Reacts to a change of an application key.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog must be reloaded and cannot be.
    pub fn handle_setting_changed(&mut self, key: &str) -> Result<(), WallpaperManagerError> {
        match key {
            BACKGROUND_PROPERTIES_PATH => {
                self.reload()?;
            }
            RANDOM => {
                let random = self.stores.application.get_bool(RANDOM).unwrap_or(false);
                self.apply_mode(OrderMode::from_random(random));
            }
            DELAY => {
                let delay = self.delay();
                self.timer.set_delay(delay);
            }
            CURRENT_WALLPAPER => {
                self.resume_position();
            }
            CHANGE_LOCKSCREEN => {
                tracing::debug!("lock screen mirroring changed, used from the next rotation");
            }
            _ => {}
        }
        Ok(())
    }

    /// Re-reads the application settings from their backing store.
    ///
    /// Subscribers registered through [`WallpaperManager::watch_settings`]
    /// are notified of the keys that changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be read.
    pub fn refresh_settings(&mut self) -> Result<Vec<String>, WallpaperManagerError> {
        Ok(self.stores.application.refresh()?)
    }

    /// Calls `on_change` with the key whenever a watched application key
    /// changes.
    pub fn watch_settings<F>(&mut self, on_change: F)
    where
        F: FnMut(&str) + Clone + Send + 'static,
    {
        for key in WATCHED_KEYS {
            let mut callback = on_change.clone();
            self.stores.application.subscribe(key, Box::new(move |key, _| callback(key)));
        }
    }

    /// Sets the preview listener and calls it once with the current preview.
    pub fn set_preview_listener(&mut self, listener: PreviewListener) {
        self.preview_listener = Some(listener);
        self.notify_preview();
    }

    fn apply_mode(&mut self, mode: OrderMode) {
        if mode == self.queue.mode() {
            return;
        }

        self.queue.set_mode(mode);
        tracing::info!(mode = %mode, "order mode changed");
        self.notify_preview();
    }

    fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            dark_mode: self.appearance.is_dark_mode(),
            mirror_to_secondary: self
                .stores
                .application
                .get_bool(CHANGE_LOCKSCREEN)
                .unwrap_or(false),
            secondary_prefers_dark_aware: self.lockscreen_dark_aware,
        }
    }

    fn persist_elapsed(&mut self) -> Result<(), WallpaperManagerError> {
        let elapsed = i32::try_from(self.timer.elapsed()).unwrap_or(i32::MAX);
        let app = self.stores.application.as_mut();
        app.write(ELAPSED_TIME, SettingValue::Int(elapsed))?;
        app.sync()?;
        Ok(())
    }

    fn notify_preview(&mut self) {
        if let Some(listener) = self.preview_listener.as_mut() {
            listener(self.queue.preview());
        }
    }
}

/// Reads the stored delay, writing the default back if it is out of range.
fn read_delay(store: &mut dyn SettingsStore) -> Delay {
    let Some(minutes) = store.get_int(DELAY) else {
        return Delay::DEFAULT;
    };

    if let Some(delay) = Delay::new(i64::from(minutes)) {
        return delay;
    }

    tracing::warn!(minutes, default = Delay::DEFAULT.minutes(), "stored delay out of range, resetting");
    if let Err(err) = store.write(DELAY, Delay::DEFAULT.into()).and_then(|()| store.sync()) {
        tracing::warn!(error = %err, "failed to reset stored delay");
    }
    Delay::DEFAULT
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::constants::background_keys::{PICTURE_URI, PICTURE_URI_DARK};
    use crate::constants::{APP_SCHEMA, BACKGROUND_SCHEMA, SCREENSAVER_SCHEMA};
    use crate::settings::{FixedAppearance, MemoryStore};

    const CATALOG_DIR: &str = "/catalog";

    /// Serves generated documents for every path under [`CATALOG_DIR`].
    struct StaticSource {
        names: Vec<&'static str>,
    }

    impl DocumentSource for StaticSource {
        fn list_documents(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
            if dir != Path::new(CATALOG_DIR) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such catalog"));
            }
            Ok(self.names.iter().map(|name| dir.join(format!("{name}.xml"))).collect())
        }

        fn read_text(&self, path: &Path) -> io::Result<String> {
            let stem = path.file_stem().unwrap().to_string_lossy();
            Ok(format!(
                "<wallpapers><wallpaper><name>{stem}</name>\
                 <filename>/bg/{stem}.jpg</filename>\
                 <filename-dark>/bg/{stem}-dark.jpg</filename-dark>\
                 <options>zoom</options></wallpaper></wallpapers>"
            ))
        }
    }

    fn app_store() -> MemoryStore {
        MemoryStore::new(APP_SCHEMA)
            .with_defaults([(BACKGROUND_PROPERTIES_PATH, SettingValue::from(CATALOG_DIR))])
    }

    fn manager_with(names: &[&'static str], application: MemoryStore) -> WallpaperManager {
        let stores = SettingsStores {
            application: Box::new(application),
            background: Box::new(MemoryStore::new(BACKGROUND_SCHEMA)),
            screensaver: Box::new(MemoryStore::new(SCREENSAVER_SCHEMA)),
        };
        let source = StaticSource { names: names.to_vec() };
        WallpaperManager::new(Box::new(source), stores, Box::new(FixedAppearance(false)))
            .with_seed(1)
    }

    fn loaded(names: &[&'static str]) -> WallpaperManager {
        let mut manager = manager_with(names, app_store());
        manager.reload().unwrap();
        manager
    }

    fn name(record: Option<&WallpaperRecord>) -> Option<String> {
        record.and_then(|r| r.name.clone())
    }

    #[test]
    fn test_new_reads_mode_and_delay() {
        let mut app = app_store();
        app.set(RANDOM, SettingValue::Bool(true));
        app.set(DELAY, SettingValue::Int(30));
        app.set(ELAPSED_TIME, SettingValue::Int(12));

        let manager = manager_with(&["a"], app);
        assert_eq!(manager.mode(), OrderMode::Shuffled);
        assert_eq!(manager.timer().delay().minutes(), 30);
        assert_eq!(manager.timer().elapsed(), 12);
    }

    #[test]
    fn test_invalid_delay_is_reset() {
        let mut app = app_store();
        app.set(DELAY, SettingValue::Int(0));

        let manager = manager_with(&["a"], app);
        assert_eq!(manager.timer().delay(), Delay::DEFAULT);
        assert_eq!(manager.stores().application.get_int(DELAY), Some(5));
    }

    #[test]
    fn test_reload_loads_catalog() {
        let manager = loaded(&["a", "b", "c"]);

        assert_eq!(manager.entries().len(), 3);
        assert_eq!(name(manager.current()).as_deref(), Some("a"));
        assert_eq!(name(manager.preview()).as_deref(), Some("b"));
    }

    #[test]
    fn test_reload_reports_missing_catalog() {
        let mut app = app_store();
        app.set(BACKGROUND_PROPERTIES_PATH, SettingValue::from("/elsewhere"));

        let mut manager = manager_with(&["a"], app);
        assert!(matches!(manager.reload(), Err(WallpaperManagerError::Catalog(_))));
    }

    #[test]
    fn test_next_applies_wallpaper() {
        let mut manager = loaded(&["a", "b"]);

        let record = manager.next().unwrap().unwrap();
        assert_eq!(record.name.as_deref(), Some("b"));

        let background = &manager.stores().background;
        assert_eq!(background.get_string(PICTURE_URI).as_deref(), Some("file:///bg/b.jpg"));
        assert_eq!(
            background.get_string(PICTURE_URI_DARK).as_deref(),
            Some("file:///bg/b-dark.jpg")
        );
        assert_eq!(
            manager.stores().application.get_string(CURRENT_WALLPAPER).as_deref(),
            Some("/catalog/b.xml")
        );
    }

    #[test]
    fn test_next_mirrors_lockscreen_when_enabled() {
        let mut app = app_store();
        app.set(CHANGE_LOCKSCREEN, SettingValue::Bool(true));
        let mut manager = manager_with(&["a", "b"], app);
        manager.reload().unwrap();

        manager.next().unwrap();
        assert_eq!(
            manager.stores().screensaver.get_string(PICTURE_URI).as_deref(),
            Some("file:///bg/b.jpg")
        );
    }

    #[test]
    fn test_next_on_singleton_is_noop() {
        let mut manager = loaded(&["only"]);

        assert!(manager.next().unwrap().is_none());
        assert!(manager.stores().background.get(PICTURE_URI).is_none());
        assert_eq!(name(manager.preview()).as_deref(), Some("only"));
    }

    #[test]
    fn test_resume_position() {
        let mut app = app_store();
        app.set(CURRENT_WALLPAPER, SettingValue::from("/catalog/b.xml"));
        let mut manager = manager_with(&["a", "b", "c"], app);
        manager.reload().unwrap();

        assert!(manager.resume_position());
        assert_eq!(name(manager.preview()).as_deref(), Some("c"));
    }

    #[test]
    fn test_set_mode_persists_flag() {
        let mut manager = loaded(&["a", "b", "c", "d"]);

        manager.set_mode(OrderMode::Shuffled).unwrap();
        assert_eq!(manager.mode(), OrderMode::Shuffled);
        assert_eq!(manager.stores().application.get_bool(RANDOM), Some(true));

        manager.set_mode(OrderMode::Sequential).unwrap();
        let names: Vec<_> = manager.entries().iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sequential_switch_rewinds_to_first_entry() {
        let mut manager = loaded(&["a", "b", "c", "d"]);
        manager.set_mode(OrderMode::Shuffled).unwrap();
        manager.skip().unwrap();
        manager.skip().unwrap();

        manager.set_mode(OrderMode::Sequential).unwrap();
        assert_eq!(manager.queue().current_index(), 0);
        assert_eq!(name(manager.current()).as_deref(), Some("a"));
        assert_eq!(name(manager.preview()).as_deref(), Some("b"));
    }

    #[test]
    fn test_set_delay() {
        let mut manager = loaded(&["a", "b"]);

        manager.set_delay(Delay::new(2).unwrap()).unwrap();
        assert_eq!(manager.delay().minutes(), 2);

        assert!(manager.tick().unwrap().is_none());
        assert_eq!(name(manager.tick().unwrap().as_ref()).as_deref(), Some("b"));
        assert_eq!(manager.stores().application.get_int(ELAPSED_TIME), Some(0));
    }

    #[test]
    fn test_tick_persists_elapsed() {
        let mut manager = loaded(&["a", "b"]);

        manager.tick().unwrap();
        manager.tick().unwrap();
        assert_eq!(manager.stores().application.get_int(ELAPSED_TIME), Some(2));
    }

    #[test]
    fn test_paused_manager_does_not_rotate() {
        let mut manager = loaded(&["a", "b"]);
        manager.set_delay(Delay::new(1).unwrap()).unwrap();
        manager.set_paused(true);

        assert!(manager.tick().unwrap().is_none());
        assert_eq!(name(manager.current()).as_deref(), Some("a"));
    }

    #[test]
    fn test_skip_restarts_timer() {
        let mut manager = loaded(&["a", "b", "c"]);
        manager.tick().unwrap();
        manager.tick().unwrap();

        manager.perform_action(WallpaperAction::Next).unwrap();
        assert_eq!(manager.timer().elapsed(), 0);
        assert_eq!(name(manager.current()).as_deref(), Some("b"));
    }

    #[test]
    fn test_failed_apply_still_advances() {
        let mut background = MemoryStore::new(BACKGROUND_SCHEMA);
        background.lock(PICTURE_URI);
        let stores = SettingsStores {
            application: Box::new(app_store()),
            background: Box::new(background),
            screensaver: Box::new(MemoryStore::new(SCREENSAVER_SCHEMA)),
        };
        let source = StaticSource { names: vec!["a", "b", "c"] };
        let mut manager =
            WallpaperManager::new(Box::new(source), stores, Box::new(FixedAppearance(true)));
        manager.reload().unwrap();

        let result = manager.next();
        assert!(matches!(
            result,
            Err(WallpaperManagerError::Settings(SettingsError::NotWritable { .. }))
        ));
        assert_eq!(name(manager.current()).as_deref(), Some("b"));
    }

    #[test]
    fn test_handle_setting_changed_random() {
        let mut manager = loaded(&["a", "b", "c"]);
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        manager.watch_settings(move |key: &str| sink.lock().unwrap().push(key.to_string()));

        manager.set_mode(OrderMode::Shuffled).unwrap();
        assert_eq!(*changes.lock().unwrap(), vec![RANDOM.to_string()]);

        manager.handle_setting_changed(RANDOM).unwrap();
        assert_eq!(manager.mode(), OrderMode::Shuffled);
    }

    #[test]
    fn test_handle_setting_changed_ignores_unknown_keys() {
        let mut manager = loaded(&["a", "b"]);
        manager.handle_setting_changed("unrelated").unwrap();
        assert_eq!(manager.entries().len(), 2);
    }

    #[test]
    fn test_preview_listener_follows_queue() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut manager = loaded(&["a", "b", "c"]);
        manager.set_preview_listener(Box::new(move |record| sink.borrow_mut().push(name(record))));
        manager.next().unwrap();

        assert_eq!(*seen.borrow(), vec![Some("b".to_string()), Some("c".to_string())]);
    }
}
