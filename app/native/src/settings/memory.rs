//! In-memory settings store.

use std::collections::{BTreeMap, BTreeSet};

use super::{ChangeCallback, SettingValue, SettingsError, SettingsStore, Subscribers};

/// A settings namespace held entirely in memory.
///
/// Used for dry runs and tests. Keys can be locked to simulate
/// non-writable settings and writes can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schema: String,
    values: BTreeMap<String, SettingValue>,
    defaults: BTreeMap<String, SettingValue>,
    locked: BTreeSet<String>,
    fail_writes: bool,
    sync_count: usize,
    subscribers: Subscribers,
}

impl MemoryStore {
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    /// Sets the values returned for keys that were never written.
    #[must_use]
    pub fn with_defaults<K: Into<String>>(
        mut self,
        defaults: impl IntoIterator<Item = (K, SettingValue)>,
    ) -> Self {
        self.defaults.extend(defaults.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Marks `key` as not writable.
    pub fn lock(&mut self, key: &str) { self.locked.insert(key.to_string()); }

    /// Makes every subsequent `set` and `reset` report failure.
    pub const fn set_fail_writes(&mut self, fail: bool) { self.fail_writes = fail; }

    /// Number of times [`SettingsStore::sync`] was called.
    #[must_use]
    pub const fn sync_count(&self) -> usize { self.sync_count }

    /// Whether `key` holds an explicitly written value.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool { self.values.contains_key(key) }
}

impl SettingsStore for MemoryStore {
    fn schema(&self) -> &str { &self.schema }

    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).or_else(|| self.defaults.get(key)).cloned()
    }

    fn set(&mut self, key: &str, value: SettingValue) -> bool {
        if self.fail_writes || self.locked.contains(key) {
            return false;
        }

        let changed = self.values.get(key) != Some(&value);
        self.values.insert(key.to_string(), value.clone());
        if changed {
            self.subscribers.notify(key, &value);
        }
        true
    }

    fn reset(&mut self, key: &str) -> bool {
        if self.fail_writes || self.locked.contains(key) {
            return false;
        }
        self.values.remove(key);
        true
    }

    fn is_writable(&self, key: &str) -> bool { !self.locked.contains(key) }

    fn subscribe(&mut self, key: &str, callback: ChangeCallback) {
        self.subscribers.add(key, callback);
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        self.sync_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_defaults_until_written() {
        let mut store = MemoryStore::new("s").with_defaults([("delay", SettingValue::Int(5))]);

        assert_eq!(store.get_int("delay"), Some(5));
        assert!(!store.is_set("delay"));

        assert!(store.set("delay", SettingValue::Int(9)));
        assert_eq!(store.get_int("delay"), Some(9));

        assert!(store.reset("delay"));
        assert_eq!(store.get_int("delay"), Some(5));
    }

    #[test]
    fn test_locked_key_rejects_writes() {
        let mut store = MemoryStore::new("s");
        store.lock("k");

        assert!(!store.is_writable("k"));
        assert!(!store.set("k", SettingValue::Bool(true)));
        assert!(!store.reset("k"));
        assert!(store.is_writable("other"));
    }

    #[test]
    fn test_subscriber_fires_on_change_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut store = MemoryStore::new("s");
        store.subscribe("random", Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.set("random", SettingValue::Bool(true));
        store.set("random", SettingValue::Bool(true));
        store.set("random", SettingValue::Bool(false));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sync_is_counted() {
        let mut store = MemoryStore::new("s");
        store.sync().unwrap();
        store.sync().unwrap();
        assert_eq!(store.sync_count(), 2);
    }
}
