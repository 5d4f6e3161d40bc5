//! Key-value persistence for the ledger.
//!
//! Everything the ledger persists goes through the [`KeyValueStore`]
//! trait: one JSON value per logical key, global keys for custom foods
//! and meals, day-scoped keys for history and totals. The production
//! backend writes one file per key under a data directory; the
//! in-memory backend serves tests and degraded sessions.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Global key holding the ordered list of custom foods.
pub const CUSTOM_FOODS_KEY: &str = "custom-foods";
/// Global key holding the ordered list of custom meals.
pub const CUSTOM_MEALS_KEY: &str = "custom-meals";

/// Day-scoped key for a day's ordered food history.
pub fn history_key(day: NaiveDate) -> String {
    format!("food-history:{}", day.format("%Y-%m-%d"))
}

/// Day-scoped key for a day's running totals.
pub fn daily_totals_key(day: NaiveDate) -> String {
    format!("daily-totals:{}", day.format("%Y-%m-%d"))
}

/// Errors from the persistence backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] io::Error),

    #[error("failed to parse stored value at {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("failed to encode value for key '{0}': {1}")]
    Encode(String, #[source] serde_json::Error),
}

/// A key-value repository holding one JSON value per key.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Loads a typed list from a key; a missing key is an empty list.
pub fn load_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    match store.get(key)? {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| StorageError::Encode(key.to_string(), e)),
        None => Ok(Vec::new()),
    }
}

/// Saves a typed list under a key.
pub fn save_list<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let value =
        serde_json::to_value(items).map_err(|e| StorageError::Encode(key.to_string(), e))?;
    store.set(key, value)
}

/// File-backed store: one JSON file per key under a data directory.
#[derive(Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the file path for a key. Colons in day-scoped keys are
    /// mapped to underscores so names stay portable.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.replace(':', "_")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Parse(path, e))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(key);
        let bytes = serde_json::to_vec_pretty(&value)
            .map_err(|e| StorageError::Encode(key.to_string(), e))?;
        fs::write(&path, bytes).map_err(|e| StorageError::Io(path, e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }
}

/// In-memory store for tests and for sessions where the file backend
/// has failed and the ledger runs memory-only.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_path_replaces_colons() {
        let (store, _temp) = test_store();
        let path = store.path("food-history:2025-03-01");
        assert!(path.ends_with("food-history_2025-03-01.json"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (store, _temp) = test_store();
        assert!(store.get("custom-foods").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let (store, _temp) = test_store();
        store.set("custom-foods", json!([{"name": "Rice cake"}])).unwrap();

        let value = store.get("custom-foods").unwrap().unwrap();
        assert_eq!(value[0]["name"], "Rice cake");
    }

    #[test]
    fn test_set_survives_reopen() {
        let (store, temp) = test_store();
        store.set("custom-meals", json!([1, 2, 3])).unwrap();

        let reopened = JsonFileStore::new(temp.path().to_path_buf());
        let value = reopened.get("custom-meals").unwrap().unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let (store, _temp) = test_store();
        store.remove("never-written").unwrap();
    }

    #[test]
    fn test_day_scoped_keys_are_independent() {
        let (store, _temp) = test_store();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();

        store.set(&history_key(monday), json!(["a"])).unwrap();
        store.set(&history_key(tuesday), json!(["b"])).unwrap();

        assert_eq!(store.get(&history_key(monday)).unwrap().unwrap(), json!(["a"]));
        assert_eq!(store.get(&history_key(tuesday)).unwrap().unwrap(), json!(["b"]));
    }

    #[test]
    fn test_key_format() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(history_key(day), "food-history:2025-03-03");
        assert_eq!(daily_totals_key(day), "daily-totals:2025-03-03");
    }

    #[test]
    fn test_typed_list_helpers() {
        let store = MemoryStore::new();
        let names: Vec<String> = load_list(&store, "custom-foods").unwrap();
        assert!(names.is_empty());

        save_list(&store, "custom-foods", &["a".to_string(), "b".to_string()]).unwrap();
        let names: Vec<String> = load_list(&store, "custom-foods").unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }
}
