//! JSON file backed settings store.
//!
//! Each namespace lives in `<dir>/<schema>.json`:
//!
//! ```json
//! {
//!   "values": { "delay": 10, "random": true },
//!   "locked": ["picture-uri"]
//! }
//! ```
//!
//! Comments are allowed when the file is edited by hand. Keys listed under
//! `locked` are reported as not writable.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use json_comments::StripComments;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{ChangeCallback, SettingValue, SettingsError, SettingsStore, Subscribers};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    values: BTreeMap<String, SettingValue>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    locked: BTreeSet<String>,
}

/// A settings namespace persisted as a JSON file.
///
/// Writes are kept in memory until [`SettingsStore::sync`], which replaces
/// the file atomically.
#[derive(Debug)]
pub struct FileStore {
    schema: String,
    path: PathBuf,
    document: StoreDocument,
    defaults: BTreeMap<String, SettingValue>,
    dirty: bool,
    detached: bool,
    subscribers: Subscribers,
}

impl FileStore {
    /// Opens the namespace `schema` under `dir`. A missing file is treated
    /// as an empty namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(dir: &Path, schema: &str) -> Result<Self, SettingsError> {
        let path = Self::path_for(dir, schema);
        let document = read_document(&path)?;

        Ok(Self {
            schema: schema.to_string(),
            path,
            document,
            defaults: BTreeMap::new(),
            dirty: false,
            detached: false,
            subscribers: Subscribers::default(),
        })
    }

    /// The file backing `schema` under `dir`.
    #[must_use]
    pub fn path_for(dir: &Path, schema: &str) -> PathBuf { dir.join(format!("{schema}.json")) }

    /// Sets the values returned for keys that were never written.
    #[must_use]
    pub fn with_defaults<K: Into<String>>(
        mut self,
        defaults: impl IntoIterator<Item = (K, SettingValue)>,
    ) -> Self {
        self.defaults.extend(defaults.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Keeps writes in memory only; [`SettingsStore::sync`] leaves the file
    /// untouched.
    #[must_use]
    pub fn detach(mut self) -> Self {
        self.detached = true;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    fn effective(&self, key: &str) -> Option<&SettingValue> {
        self.document.values.get(key).or_else(|| self.defaults.get(key))
    }
}

impl SettingsStore for FileStore {
    fn schema(&self) -> &str { &self.schema }

    fn get(&self, key: &str) -> Option<SettingValue> { self.effective(key).cloned() }

    fn set(&mut self, key: &str, value: SettingValue) -> bool {
        if !self.is_writable(key) {
            return false;
        }

        let changed = self.effective(key) != Some(&value);
        self.document.values.insert(key.to_string(), value.clone());
        self.dirty = true;
        if changed {
            self.subscribers.notify(key, &value);
        }
        true
    }

    fn reset(&mut self, key: &str) -> bool {
        if !self.is_writable(key) {
            return false;
        }
        if self.document.values.remove(key).is_some() {
            self.dirty = true;
        }
        true
    }

    fn is_writable(&self, key: &str) -> bool { !self.document.locked.contains(key) }

    fn subscribe(&mut self, key: &str, callback: ChangeCallback) {
        self.subscribers.add(key, callback);
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }
        if self.detached {
            tracing::debug!(schema = %self.schema, "detached store, not writing settings file");
            return Ok(());
        }

        write_document(&self.path, &self.document).map_err(|source| SettingsError::Sync {
            schema: self.schema.clone(),
            source,
        })?;
        self.dirty = false;

        tracing::debug!(schema = %self.schema, path = %self.path.display(), "settings synced");
        Ok(())
    }

    /// Re-reads the file and notifies subscribers of every key whose
    /// effective value changed. Unsynced writes are discarded.
    fn refresh(&mut self) -> Result<Vec<String>, SettingsError> {
        let document = read_document(&self.path)?;

        let keys: BTreeSet<String> =
            self.document.values.keys().chain(document.values.keys()).cloned().collect();
        let changed: Vec<(String, Option<SettingValue>)> = keys
            .into_iter()
            .filter_map(|key| {
                let before = self.effective(&key).cloned();
                let after = document.values.get(&key).or_else(|| self.defaults.get(&key)).cloned();
                (before != after).then_some((key, after))
            })
            .collect();

        self.document = document;
        self.dirty = false;

        for (key, value) in &changed {
            if let Some(value) = value {
                self.subscribers.notify(key, value);
            }
        }

        Ok(changed.into_iter().map(|(key, _)| key).collect())
    }
}

fn read_document(path: &Path) -> Result<StoreDocument, SettingsError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(StoreDocument::default());
        }
        Err(source) => {
            return Err(SettingsError::Read { path: path.to_path_buf(), source });
        }
    };

    let mut contents = String::new();
    StripComments::new(file)
        .read_to_string(&mut contents)
        .map_err(|source| SettingsError::Read { path: path.to_path_buf(), source })?;

    if contents.trim().is_empty() {
        return Ok(StoreDocument::default());
    }

    serde_json::from_str(&contents)
        .map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })
}

fn write_document(path: &Path, document: &StoreDocument) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path(), "org.example").unwrap();

        assert_eq!(store.path(), dir.path().join("org.example.json"));
        assert!(store.get("delay").is_none());
    }

    #[test]
    fn test_values_persist_after_sync() {
        let dir = TempDir::new().unwrap();

        let mut store = FileStore::open(dir.path(), "org.example").unwrap();
        assert!(store.set("delay", SettingValue::Int(15)));
        assert!(store.set("picture-uri", "file:///a.png".into()));
        assert!(!store.path().exists());
        store.sync().unwrap();

        let reopened = FileStore::open(dir.path(), "org.example").unwrap();
        assert_eq!(reopened.get_int("delay"), Some(15));
        assert_eq!(reopened.get_string("picture-uri").as_deref(), Some("file:///a.png"));
    }

    #[test]
    fn test_reads_commented_file_with_locks() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("org.example.json"),
            r#"{
                // edited by hand
                "values": { "random": true },
                "locked": ["picture-uri"]
            }"#,
        )
        .unwrap();

        let mut store = FileStore::open(dir.path(), "org.example").unwrap();
        assert_eq!(store.get_bool("random"), Some(true));
        assert!(!store.is_writable("picture-uri"));
        assert!(!store.set("picture-uri", "file:///x".into()));
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("org.example.json"), "{ not json").unwrap();

        let result = FileStore::open(dir.path(), "org.example");
        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_detached_store_never_writes() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path(), "org.example").unwrap().detach();

        store.set("delay", SettingValue::Int(3));
        store.sync().unwrap();

        assert_eq!(store.get_int("delay"), Some(3));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_reset_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path(), "org.example")
            .unwrap()
            .with_defaults([("delay", SettingValue::Int(5))]);

        store.set("delay", SettingValue::Int(30));
        assert!(store.reset("delay"));
        assert_eq!(store.get_int("delay"), Some(5));
    }

    #[test]
    fn test_refresh_reports_external_changes() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path(), "org.example").unwrap();
        store.set("delay", SettingValue::Int(5));
        store.set("random", SettingValue::Bool(false));
        store.sync().unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe("delay", Box::new(move |_, value| sink.lock().unwrap().push(value.clone())));

        let mut other = FileStore::open(dir.path(), "org.example").unwrap();
        other.set("delay", SettingValue::Int(20));
        other.sync().unwrap();

        let changed = store.refresh().unwrap();
        assert_eq!(changed, vec!["delay".to_string()]);
        assert_eq!(store.get_int("delay"), Some(20));
        assert_eq!(*seen.lock().unwrap(), vec![SettingValue::Int(20)]);
    }
}
