//! Writes a wallpaper record into the background settings namespaces.

use super::{SettingValue, SettingsError, SettingsStore};
use crate::catalog::WallpaperRecord;
use crate::constants::app_keys::CURRENT_WALLPAPER;
use crate::constants::background_keys::{
    COLOR_SHADING_TYPE, PICTURE_OPTIONS, PICTURE_URI, PICTURE_URI_DARK, PRIMARY_COLOR,
    SECONDARY_COLOR,
};
use crate::platform::file_uri;

/// How a record is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Whether the desktop currently prefers dark variants.
    pub dark_mode: bool,
    /// Also write the record into the lock screen namespace.
    pub mirror_to_secondary: bool,
    /// Use the dark filename for the lock screen when `dark_mode` is on.
    /// When off, the lock screen always gets the light filename.
    pub secondary_prefers_dark_aware: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dark_mode: false,
            mirror_to_secondary: false,
            secondary_prefers_dark_aware: true,
        }
    }
}

/// Applies wallpaper records to the desktop and lock screen namespaces.
///
/// Each write checks writability first. A failure stops the apply and is
/// returned, but writes already made are kept. Every namespace is synced
/// once per apply, on success and on failure alike.
pub struct SettingsSync<'a> {
    background: &'a mut dyn SettingsStore,
    screensaver: &'a mut dyn SettingsStore,
    application: &'a mut dyn SettingsStore,
}

impl<'a> SettingsSync<'a> {
    #[must_use]
    pub fn new(
        background: &'a mut dyn SettingsStore,
        screensaver: &'a mut dyn SettingsStore,
        application: &'a mut dyn SettingsStore,
    ) -> Self {
        Self { background, screensaver, application }
    }

    /// Writes `record` into the settings namespaces.
    ///
    /// The desktop namespace receives both variants: the light filename
    /// under `picture-uri` and the dark filename under `picture-uri-dark`.
    /// Filenames are written as `file://` URIs. Fields missing from the
    /// record reset their key to its default.
    ///
    /// # Errors
    ///
    /// Returns the first failed write or sync.
    pub fn apply(
        &mut self,
        record: &WallpaperRecord,
        options: ApplyOptions,
    ) -> Result<(), SettingsError> {
        let written = self.write_all(record, options);
        let synced = self.sync_all(options.mirror_to_secondary);

        match written {
            Ok(()) => {
                synced?;
                tracing::info!(
                    wallpaper = %record.display_name(),
                    dark_mode = options.dark_mode,
                    lockscreen = options.mirror_to_secondary,
                    "wallpaper applied"
                );
                Ok(())
            }
            Err(err) => {
                if let Err(sync_err) = synced {
                    tracing::warn!(error = %sync_err, "sync after failed apply also failed");
                }
                Err(err)
            }
        }
    }

    fn write_all(
        &mut self,
        record: &WallpaperRecord,
        options: ApplyOptions,
    ) -> Result<(), SettingsError> {
        write_optional(self.background, PICTURE_URI, record.filename_light.as_deref().map(file_uri))?;
        write_optional(
            self.background,
            PICTURE_URI_DARK,
            record.filename_dark.as_deref().map(file_uri),
        )?;
        write_shading(self.background, record)?;

        write_optional(
            self.application,
            CURRENT_WALLPAPER,
            Some(record.source_path.to_string_lossy().into_owned()),
        )?;

        if options.mirror_to_secondary {
            let picture = if options.secondary_prefers_dark_aware && options.dark_mode {
                record.filename_dark.as_deref()
            } else {
                record.filename_light.as_deref()
            };
            write_optional(self.screensaver, PICTURE_URI, picture.map(file_uri))?;
            write_shading(self.screensaver, record)?;
        }

        Ok(())
    }

    fn sync_all(&mut self, include_secondary: bool) -> Result<(), SettingsError> {
        let mut results = vec![sync_store(self.background), sync_store(self.application)];
        if include_secondary {
            results.push(sync_store(self.screensaver));
        }

        results.into_iter().find_map(Result::err).map_or(Ok(()), Err)
    }
}

fn write_shading(store: &mut dyn SettingsStore, record: &WallpaperRecord) -> Result<(), SettingsError> {
    write_optional(store, PICTURE_OPTIONS, record.options.clone())?;
    write_optional(store, COLOR_SHADING_TYPE, record.shade_type.clone())?;
    write_optional(store, PRIMARY_COLOR, record.primary_color.clone())?;
    write_optional(store, SECONDARY_COLOR, record.secondary_color.clone())
}

/// Writes `value`, or resets the key when there is none.
fn write_optional(
    store: &mut dyn SettingsStore,
    key: &str,
    value: Option<String>,
) -> Result<(), SettingsError> {
    match value {
        Some(value) => store.write(key, SettingValue::Str(value)),
        None => store.write_reset(key),
    }
}

fn sync_store(store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
    store.sync().inspect_err(|err| {
        tracing::warn!(schema = store.schema(), error = %err, "settings sync failed");
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::constants::{APP_SCHEMA, BACKGROUND_SCHEMA, SCREENSAVER_SCHEMA};
    use crate::settings::MemoryStore;

    struct Stores {
        background: MemoryStore,
        screensaver: MemoryStore,
        application: MemoryStore,
    }

    impl Stores {
        fn new() -> Self {
            Self {
                background: MemoryStore::new(BACKGROUND_SCHEMA),
                screensaver: MemoryStore::new(SCREENSAVER_SCHEMA),
                application: MemoryStore::new(APP_SCHEMA),
            }
        }

        fn apply(&mut self, record: &WallpaperRecord, options: ApplyOptions) -> Result<(), SettingsError> {
            SettingsSync::new(&mut self.background, &mut self.screensaver, &mut self.application)
                .apply(record, options)
        }
    }

    fn record() -> WallpaperRecord {
        WallpaperRecord {
            source_path: PathBuf::from("/cat/adwaita.xml"),
            name: Some("Adwaita".to_string()),
            filename_light: Some("/bg/light.jpg".to_string()),
            filename_dark: Some("/bg/dark.jpg".to_string()),
            options: Some("zoom".to_string()),
            shade_type: Some("solid".to_string()),
            primary_color: Some("#3071AE".to_string()),
            secondary_color: Some("#000000".to_string()),
        }
    }

    fn string(store: &MemoryStore, key: &str) -> Option<String> { store.get_string(key) }

    #[test]
    fn writes_both_variants_to_primary() {
        let mut stores = Stores::new();
        stores
            .apply(&record(), ApplyOptions { dark_mode: true, ..ApplyOptions::default() })
            .unwrap();

        let bg = &stores.background;
        assert_eq!(string(bg, PICTURE_URI).as_deref(), Some("file:///bg/light.jpg"));
        assert_eq!(string(bg, PICTURE_URI_DARK).as_deref(), Some("file:///bg/dark.jpg"));
        assert_eq!(string(bg, PICTURE_OPTIONS).as_deref(), Some("zoom"));
        assert_eq!(string(bg, COLOR_SHADING_TYPE).as_deref(), Some("solid"));
        assert_eq!(string(bg, PRIMARY_COLOR).as_deref(), Some("#3071AE"));
        assert_eq!(string(bg, SECONDARY_COLOR).as_deref(), Some("#000000"));
        assert_eq!(
            string(&stores.application, CURRENT_WALLPAPER).as_deref(),
            Some("/cat/adwaita.xml")
        );
    }

    #[test]
    fn secondary_untouched_without_mirroring() {
        let mut stores = Stores::new();
        stores.apply(&record(), ApplyOptions::default()).unwrap();

        assert!(!stores.screensaver.is_set(PICTURE_URI));
        assert_eq!(stores.screensaver.sync_count(), 0);
    }

    #[test]
    fn secondary_gets_light_variant_unless_dark_aware() {
        let mut stores = Stores::new();
        let options = ApplyOptions {
            dark_mode: true,
            mirror_to_secondary: true,
            secondary_prefers_dark_aware: false,
        };
        stores.apply(&record(), options).unwrap();

        let ss = &stores.screensaver;
        assert_eq!(string(ss, PICTURE_URI).as_deref(), Some("file:///bg/light.jpg"));
        assert_eq!(string(ss, PICTURE_OPTIONS).as_deref(), Some("zoom"));
        assert!(!ss.is_set(PICTURE_URI_DARK));
    }

    #[test]
    fn dark_aware_secondary_follows_dark_mode() {
        let mut stores = Stores::new();
        let mut options = ApplyOptions {
            dark_mode: true,
            mirror_to_secondary: true,
            secondary_prefers_dark_aware: true,
        };
        stores.apply(&record(), options).unwrap();
        assert_eq!(
            string(&stores.screensaver, PICTURE_URI).as_deref(),
            Some("file:///bg/dark.jpg")
        );

        options.dark_mode = false;
        stores.apply(&record(), options).unwrap();
        assert_eq!(
            string(&stores.screensaver, PICTURE_URI).as_deref(),
            Some("file:///bg/light.jpg")
        );
    }

    #[test]
    fn default_options_follow_dark_mode_on_secondary() {
        let mut stores = Stores::new();
        let options =
            ApplyOptions { dark_mode: true, mirror_to_secondary: true, ..ApplyOptions::default() };
        stores.apply(&record(), options).unwrap();

        assert_eq!(
            string(&stores.screensaver, PICTURE_URI).as_deref(),
            Some("file:///bg/dark.jpg")
        );
    }

    #[test]
    fn missing_dark_variant_resets_secondary_picture() {
        let mut stores = Stores::new();
        let options =
            ApplyOptions { dark_mode: true, mirror_to_secondary: true, ..ApplyOptions::default() };
        stores.apply(&record(), options).unwrap();
        assert!(stores.screensaver.is_set(PICTURE_URI));

        let mut light_only = record();
        light_only.filename_dark = None;
        stores.apply(&light_only, options).unwrap();

        assert!(!stores.screensaver.is_set(PICTURE_URI));
        assert!(!stores.background.is_set(PICTURE_URI_DARK));
        assert_eq!(
            string(&stores.background, PICTURE_URI).as_deref(),
            Some("file:///bg/light.jpg")
        );
    }

    #[test]
    fn missing_fields_reset_keys() {
        let mut stores = Stores::new();
        stores.apply(&record(), ApplyOptions::default()).unwrap();

        let mut sparse = record();
        sparse.filename_dark = None;
        sparse.primary_color = None;
        stores.apply(&sparse, ApplyOptions::default()).unwrap();

        assert!(!stores.background.is_set(PICTURE_URI_DARK));
        assert!(!stores.background.is_set(PRIMARY_COLOR));
        assert!(stores.background.is_set(SECONDARY_COLOR));
    }

    #[test]
    fn syncs_each_namespace_once() {
        let mut stores = Stores::new();
        let options = ApplyOptions { mirror_to_secondary: true, ..ApplyOptions::default() };
        stores.apply(&record(), options).unwrap();

        assert_eq!(stores.background.sync_count(), 1);
        assert_eq!(stores.application.sync_count(), 1);
        assert_eq!(stores.screensaver.sync_count(), 1);
    }

    #[test]
    fn failure_keeps_earlier_writes() {
        let mut stores = Stores::new();
        stores.screensaver.lock(COLOR_SHADING_TYPE);
        let options = ApplyOptions { mirror_to_secondary: true, ..ApplyOptions::default() };

        let err = stores.apply(&record(), options).unwrap_err();

        assert!(matches!(
            &err,
            SettingsError::NotWritable { schema, key }
                if schema == SCREENSAVER_SCHEMA && key == COLOR_SHADING_TYPE
        ));
        assert_eq!(
            string(&stores.background, PICTURE_URI).as_deref(),
            Some("file:///bg/light.jpg")
        );
        assert_eq!(string(&stores.screensaver, PICTURE_OPTIONS).as_deref(), Some("zoom"));
        assert!(!stores.screensaver.is_set(PRIMARY_COLOR));
        assert_eq!(stores.screensaver.sync_count(), 1);
    }

    #[test]
    fn rejected_write_is_set_failed() {
        let mut stores = Stores::new();
        stores.background.set_fail_writes(true);

        let err = stores.apply(&record(), ApplyOptions::default()).unwrap_err();
        assert!(matches!(err, SettingsError::SetFailed { .. }));
        assert!(!stores.application.is_set(CURRENT_WALLPAPER));
    }
}
