//! Budget version repository for JSON storage
//!
//! Each version is one top-level record. Its line items, transactions and
//! payroll items are kept as three independently serialized text fields.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetVersion, LockInfo, VersionId};

use super::file_io::{read_json, write_json_atomic};

/// Stored form of a budget version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: VersionId,
    pub name: String,
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locked_by: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub notes: String,
    /// Serialized `Vec<BudgetLineItem>`
    #[serde(default)]
    pub line_items_data: String,
    /// Serialized `Vec<BudgetTransaction>`
    #[serde(default)]
    pub transactions_data: String,
    /// Serialized `Vec<PayrollLineItem>`
    #[serde(default)]
    pub payroll_data: String,
}

impl VersionRecord {
    /// Flatten a version, serializing each nested collection on its own
    pub fn from_version(version: &BudgetVersion) -> LedgerResult<Self> {
        Ok(Self {
            id: version.id,
            name: version.name.clone(),
            created_date: version.created_date,
            is_locked: version.is_locked,
            locked_at: version.lock_info.as_ref().map(|l| l.locked_at),
            locked_by: version.lock_info.as_ref().map(|l| l.locked_by.clone()),
            currency: version.currency.clone(),
            notes: version.notes.clone(),
            line_items_data: serde_json::to_string(&version.line_items)?,
            transactions_data: serde_json::to_string(&version.transactions)?,
            payroll_data: serde_json::to_string(&version.payroll_items)?,
        })
    }

    /// Rebuild the version; empty blobs decode as empty collections
    pub fn to_version(&self) -> LedgerResult<BudgetVersion> {
        let lock_info = match (self.is_locked, self.locked_at) {
            (true, Some(locked_at)) => Some(LockInfo {
                locked_at,
                locked_by: self.locked_by.clone().unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(BudgetVersion {
            id: self.id,
            name: self.name.clone(),
            created_date: self.created_date,
            is_locked: self.is_locked,
            lock_info,
            currency: self.currency.clone(),
            notes: self.notes.clone(),
            line_items: decode_blob(&self.line_items_data, "line items")?,
            transactions: decode_blob(&self.transactions_data, "transactions")?,
            payroll_items: decode_blob(&self.payroll_data, "payroll items")?,
        })
    }
}

fn decode_blob<T>(data: &str, what: &str) -> LedgerResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(data)
        .map_err(|e| LedgerError::Storage(format!("Failed to decode {}: {}", what, e)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VersionData {
    #[serde(default)]
    versions: Vec<VersionRecord>,
}

/// Repository for budget version persistence
pub struct VersionRepository {
    path: PathBuf,
    records: RwLock<HashMap<VersionId, VersionRecord>>,
}

impl VersionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, HashMap<VersionId, VersionRecord>>> {
        self.records
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, HashMap<VersionId, VersionRecord>>> {
        self.records
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, discarding anything not yet saved
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: VersionData = read_json(&self.path)?;

        let mut records = self.write()?;
        records.clear();
        for record in file_data.versions {
            records.insert(record.id, record);
        }

        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> LedgerResult<()> {
        let records = self.read()?;

        let mut versions: Vec<_> = records.values().cloned().collect();
        versions.sort_by(|a, b| a.created_date.cmp(&b.created_date));

        write_json_atomic(&self.path, &VersionData { versions })
    }

    pub fn get(&self, id: VersionId) -> LedgerResult<Option<VersionRecord>> {
        Ok(self.read()?.get(&id).cloned())
    }

    pub fn exists(&self, id: VersionId) -> LedgerResult<bool> {
        Ok(self.read()?.contains_key(&id))
    }

    /// All records, newest first
    pub fn get_all(&self) -> LedgerResult<Vec<VersionRecord>> {
        let mut list: Vec<_> = self.read()?.values().cloned().collect();
        list.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        Ok(list)
    }

    pub fn count(&self) -> LedgerResult<usize> {
        Ok(self.read()?.len())
    }

    /// Stage a record without saving; returns false if the id is already present
    pub fn insert_if_absent(&self, record: VersionRecord) -> LedgerResult<bool> {
        let mut records = self.write()?;
        if records.contains_key(&record.id) {
            return Ok(false);
        }
        records.insert(record.id, record);
        Ok(true)
    }

    /// Upsert a record and save
    ///
    /// If the save fails the previous record (or its absence) is restored, so
    /// readers never observe a change that is not on disk.
    pub fn commit(&self, record: VersionRecord) -> LedgerResult<()> {
        let id = record.id;
        let previous = self.write()?.insert(id, record);

        if let Err(e) = self.save() {
            error!(version = %id, error = %e, "failed to persist budget version");
            let mut records = self.write()?;
            match previous {
                Some(previous) => records.insert(id, previous),
                None => records.remove(&id),
            };
            return Err(e);
        }

        Ok(())
    }

    /// Delete a record and save, restoring it if the save fails
    pub fn remove(&self, id: VersionId) -> LedgerResult<Option<VersionRecord>> {
        let removed = self.write()?.remove(&id);
        let Some(removed) = removed else {
            return Ok(None);
        };

        if let Err(e) = self.save() {
            error!(version = %id, error = %e, "failed to persist version deletion");
            self.write()?.insert(id, removed);
            return Err(e);
        }

        Ok(Some(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetLineItem, BudgetTransaction, ContactType, PayrollLineItem};
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, VersionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = VersionRepository::new(temp_dir.path().join("data").join("versions.json"));
        (temp_dir, repo)
    }

    fn sample_version(name: &str) -> BudgetVersion {
        let mut version = BudgetVersion::new(name, "USD");
        version
            .line_items
            .push(BudgetLineItem::with_amounts("Grip", "Below the Line", 2.0, 5.0, 400.0));
        version.transactions.push(BudgetTransaction::expense(
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            800.0,
            "Grip",
        ));
        version.payroll_items.push(PayrollLineItem::new(
            "Kim Park",
            "Key Grip",
            "Grip",
            ContactType::Crew,
            4000.0,
        ));
        version
    }

    #[test]
    fn test_record_round_trip_keeps_collections() {
        let mut version = sample_version("Prep");
        version.lock("Producer");

        let record = VersionRecord::from_version(&version).unwrap();
        assert!(record.line_items_data.contains("Grip"));
        assert_eq!(record.locked_by.as_deref(), Some("Producer"));

        let restored = record.to_version().unwrap();
        assert_eq!(restored, version);
    }

    #[test]
    fn test_empty_blobs_decode_as_empty() {
        let version = BudgetVersion::new("Empty", "USD");
        let mut record = VersionRecord::from_version(&version).unwrap();
        record.line_items_data.clear();
        record.payroll_data = "  ".into();

        let restored = record.to_version().unwrap();
        assert!(restored.line_items.is_empty());
        assert!(restored.payroll_items.is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let version = BudgetVersion::new("Broken", "USD");
        let mut record = VersionRecord::from_version(&version).unwrap();
        record.transactions_data = "[{".into();
        assert!(matches!(record.to_version(), Err(LedgerError::Storage(_))));
    }

    #[test]
    fn test_commit_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let version = sample_version("Shoot");
        repo.commit(VersionRecord::from_version(&version).unwrap()).unwrap();

        let repo2 = VersionRepository::new(temp_dir.path().join("data").join("versions.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
        let loaded = repo2.get(version.id).unwrap().unwrap().to_version().unwrap();
        assert_eq!(loaded.name, "Shoot");
        assert_eq!(loaded.payroll_items.len(), 1);
    }

    #[test]
    fn test_get_all_newest_first() {
        let (_temp_dir, repo) = create_test_repo();

        let mut older = sample_version("Older");
        older.created_date = Utc::now() - Duration::days(2);
        let newer = sample_version("Newer");

        repo.commit(VersionRecord::from_version(&older).unwrap()).unwrap();
        repo.commit(VersionRecord::from_version(&newer).unwrap()).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[test]
    fn test_insert_if_absent() {
        let (_temp_dir, repo) = create_test_repo();
        let record = VersionRecord::from_version(&sample_version("Draft")).unwrap();

        assert!(repo.insert_if_absent(record.clone()).unwrap());
        assert!(!repo.insert_if_absent(record).unwrap());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();
        let repo = VersionRepository::new(blocker.join("versions.json"));

        let version = sample_version("Unsaved");
        let result = repo.commit(VersionRecord::from_version(&version).unwrap());

        assert!(result.is_err());
        assert!(!repo.exists(version.id).unwrap());
    }

    #[test]
    fn test_remove() {
        let (_temp_dir, repo) = create_test_repo();
        let version = sample_version("Scratch");
        repo.commit(VersionRecord::from_version(&version).unwrap()).unwrap();

        let removed = repo.remove(version.id).unwrap();
        assert_eq!(removed.map(|r| r.name), Some("Scratch".to_string()));
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.remove(version.id).unwrap().is_none());
    }
}
