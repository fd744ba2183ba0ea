//! Key-value settings stores and the wallpaper settings synchronizer.
//!
//! A [`SettingsStore`] models one settings namespace (a GSettings schema).
//! Three backends are provided:
//!
//! - [`MemoryStore`] keeps values in memory and is used for dry runs and tests
//! - [`FileStore`] persists values as JSON under a directory
//! - [`GSettingsStore`] shells out to the `gsettings` tool
//!
//! [`SettingsSync`] writes a wallpaper record into the background namespaces.

pub mod appearance;
pub mod file;
pub mod gsettings;
pub mod memory;
pub mod sync;
pub mod watcher;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

pub use appearance::{Appearance, ColorSchemeAppearance, FixedAppearance};
pub use file::FileStore;
pub use gsettings::GSettingsStore;
pub use memory::MemoryStore;
use serde::{Deserialize, Serialize};
pub use sync::{ApplyOptions, SettingsSync};
use thiserror::Error;

/// A typed settings value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i32),
    Str(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self { Self::Bool(value) }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self { Self::Int(value) }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self { Self::Str(value.to_string()) }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self { Self::Str(value) }
}

/// Callback invoked with the key and new value after a change.
pub type ChangeCallback = Box<dyn FnMut(&str, &SettingValue) + Send>;

/// Errors that can occur while reading or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("The key '{key}' of {schema} is not writable")]
    NotWritable { schema: String, key: String },

    #[error("Couldn't set the key '{key}' of {schema}")]
    SetFailed { schema: String, key: String },

    #[error("Failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to sync settings for {schema}: {source}")]
    Sync {
        schema: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },
}

impl SettingsError {
    fn not_writable(schema: &str, key: &str) -> Self {
        Self::NotWritable {
            schema: schema.to_string(),
            key: key.to_string(),
        }
    }

    fn set_failed(schema: &str, key: &str) -> Self {
        Self::SetFailed {
            schema: schema.to_string(),
            key: key.to_string(),
        }
    }
}

/// One settings namespace.
///
/// `set` and `reset` report success as a boolean, the way GSettings does;
/// [`SettingsStore::write`] and [`SettingsStore::write_reset`] wrap them with
/// a writability check and typed errors.
pub trait SettingsStore {
    /// The namespace identifier.
    fn schema(&self) -> &str;

    /// Reads the current value of `key`, falling back to its default.
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Sets `key` to `value`. Returns `false` if the write was rejected.
    fn set(&mut self, key: &str, value: SettingValue) -> bool;

    /// Resets `key` to its default. Returns `false` if the reset was rejected.
    fn reset(&mut self, key: &str) -> bool;

    /// Whether `key` may be written.
    fn is_writable(&self, key: &str) -> bool;

    /// Registers a callback for changes to `key`.
    fn subscribe(&mut self, key: &str, callback: ChangeCallback);

    /// Flushes pending writes.
    ///
    /// # Errors
    ///
    /// Returns an error if pending writes could not be persisted.
    fn sync(&mut self) -> Result<(), SettingsError>;

    /// Picks up external modifications and notifies subscribers of the keys
    /// that changed. Backends without external state have nothing to do.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing state could not be read.
    fn refresh(&mut self) -> Result<Vec<String>, SettingsError> { Ok(Vec::new()) }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(SettingValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key) {
            Some(SettingValue::Int(value)) => Some(value),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(SettingValue::Bool(value)) => Some(value),
            _ => None,
        }
    }

    /// Writes `key` after checking that it is writable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotWritable`] or [`SettingsError::SetFailed`].
    fn write(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        if !self.is_writable(key) {
            return Err(SettingsError::not_writable(self.schema(), key));
        }
        if !self.set(key, value) {
            return Err(SettingsError::set_failed(self.schema(), key));
        }
        Ok(())
    }

    /// Resets `key` after checking that it is writable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotWritable`] or [`SettingsError::SetFailed`].
    fn write_reset(&mut self, key: &str) -> Result<(), SettingsError> {
        if !self.is_writable(key) {
            return Err(SettingsError::not_writable(self.schema(), key));
        }
        if !self.reset(key) {
            return Err(SettingsError::set_failed(self.schema(), key));
        }
        Ok(())
    }
}

/// Change callbacks grouped by key.
#[derive(Default)]
pub struct Subscribers {
    callbacks: HashMap<String, Vec<ChangeCallback>>,
}

impl Subscribers {
    pub fn add(&mut self, key: &str, callback: ChangeCallback) {
        self.callbacks.entry(key.to_string()).or_default().push(callback);
    }

    pub fn notify(&mut self, key: &str, value: &SettingValue) {
        if let Some(callbacks) = self.callbacks.get_mut(key) {
            for callback in callbacks {
                callback(key, value);
            }
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers").field("keys", &self.callbacks.keys().collect::<Vec<_>>()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_setting_value_display() {
        assert_eq!(SettingValue::Bool(true).to_string(), "true");
        assert_eq!(SettingValue::Int(5).to_string(), "5");
        assert_eq!(SettingValue::from("zoom").to_string(), "zoom");
    }

    #[test]
    fn test_setting_value_json_is_untagged() {
        let values: Vec<SettingValue> = serde_json::from_str(r#"[true, 12, "x"]"#).unwrap();
        assert_eq!(values, vec![
            SettingValue::Bool(true),
            SettingValue::Int(12),
            SettingValue::Str("x".to_string()),
        ]);
    }

    #[test]
    fn test_typed_getters_reject_other_types() {
        let store = MemoryStore::new("test").with_defaults([("delay", SettingValue::Int(5))]);
        assert_eq!(store.get_int("delay"), Some(5));
        assert_eq!(store.get_string("delay"), None);
        assert_eq!(store.get_bool("delay"), None);
    }

    #[test]
    fn test_write_checks_writability() {
        let mut store = MemoryStore::new("test");
        store.lock("picture-uri");

        let err = store.write("picture-uri", "file:///a".into()).unwrap_err();
        assert!(matches!(err, SettingsError::NotWritable { .. }));
        assert_eq!(err.to_string(), "The key 'picture-uri' of test is not writable");
        assert!(store.get("picture-uri").is_none());
    }

    #[test]
    fn test_write_reports_rejected_set() {
        let mut store = MemoryStore::new("test");
        store.set_fail_writes(true);

        let err = store.write("picture-uri", "file:///a".into()).unwrap_err();
        assert!(matches!(err, SettingsError::SetFailed { .. }));
        assert_eq!(err.to_string(), "Couldn't set the key 'picture-uri' of test");
    }

    #[test]
    fn test_subscribers_only_see_their_key() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut subscribers = Subscribers::default();
        let sink = Arc::clone(&seen);
        subscribers.add("delay", Box::new(move |key, value| {
            sink.lock().unwrap().push(format!("{key}={value}"));
        }));

        subscribers.notify("random", &SettingValue::Bool(true));
        subscribers.notify("delay", &SettingValue::Int(7));

        assert_eq!(*seen.lock().unwrap(), vec!["delay=7".to_string()]);
    }
}
