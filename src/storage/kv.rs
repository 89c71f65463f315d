//! Small string key-value store
//!
//! Backs the legacy version blob, its migration backups and UI state such
//! as which line items are expanded.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;

use super::file_io::{read_json, write_json_atomic};

/// Persistent map of string keys to string values
pub struct KeyValueStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl KeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            values: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: BTreeMap<String, String> = read_json(&self.path)?;

        let mut values = self
            .values
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *values = file_data;

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let values = self
            .values
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(&self.path, &*values)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let values = self
            .values
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(values.get(key).cloned())
    }

    /// Set a value and save; the previous value is restored if saving fails
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), LedgerError> {
        let previous = {
            let mut values = self
                .values
                .write()
                .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
            values.insert(key.to_string(), value.into())
        };

        if let Err(e) = self.save() {
            self.restore(key, previous)?;
            return Err(e);
        }

        Ok(())
    }

    /// Remove a key and save
    pub fn remove(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let previous = {
            let mut values = self
                .values
                .write()
                .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
            values.remove(key)
        };

        if previous.is_none() {
            return Ok(None);
        }

        if let Err(e) = self.save() {
            self.restore(key, previous)?;
            return Err(e);
        }

        Ok(previous)
    }

    /// Keys starting with `prefix`, in order
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, LedgerError> {
        let values = self
            .values
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(values
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn restore(&self, key: &str, previous: Option<String>) -> Result<(), LedgerError> {
        let mut values = self
            .values
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match previous {
            Some(value) => values.insert(key.to_string(), value),
            None => values.remove(key),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("defaults.json");

        let store = KeyValueStore::new(path.clone());
        store.load().unwrap();
        assert!(store.get("theme").unwrap().is_none());

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));

        let reopened = KeyValueStore::new(path);
        reopened.load().unwrap();
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyValueStore::new(temp_dir.path().join("defaults.json"));

        store.set("a", "1").unwrap();
        assert_eq!(store.remove("a").unwrap().as_deref(), Some("1"));
        assert!(store.remove("a").unwrap().is_none());
    }

    #[test]
    fn test_keys_with_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyValueStore::new(temp_dir.path().join("defaults.json"));

        store.set("saved.backup.2", "x").unwrap();
        store.set("saved.backup.1", "y").unwrap();
        store.set("saved", "z").unwrap();

        let keys = store.keys_with_prefix("saved.backup.").unwrap();
        assert_eq!(keys, vec!["saved.backup.1", "saved.backup.2"]);
    }

    #[test]
    fn test_failed_set_restores_previous() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("data");
        std::fs::write(&blocker, "file").unwrap();
        let store = KeyValueStore::new(blocker.join("defaults.json"));

        assert!(store.set("key", "value").is_err());
        assert!(store.get("key").unwrap().is_none());
    }
}
