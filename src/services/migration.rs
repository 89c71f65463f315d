//! Legacy data migration
//!
//! Older builds kept every budget version in one key-value entry: a JSON
//! array of complete version snapshots. This moves each snapshot into the
//! version repository exactly once. Re-running is safe; versions already
//! present are skipped and the legacy entry is never modified or removed.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::BudgetVersion;
use crate::storage::{Storage, VersionRecord};

/// Outcome of one migration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub migrated: usize,
    pub skipped: usize,
    /// Legacy entries that could not be decoded
    pub failed: usize,
    /// Key the legacy blob was copied to, if a backup was written
    pub backup_key: Option<String>,
}

/// Legacy vs relational version counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub legacy_count: usize,
    pub relational_count: usize,
    pub passed: bool,
}

pub struct MigrationManager<'a> {
    storage: &'a Storage,
    legacy_key: &'a str,
}

impl<'a> MigrationManager<'a> {
    pub fn new(storage: &'a Storage, legacy_key: &'a str) -> Self {
        Self {
            storage,
            legacy_key,
        }
    }

    pub fn legacy_key(&self) -> &str {
        self.legacy_key
    }

    /// Key for a backup of the legacy blob taken now
    pub fn backup_key(&self) -> String {
        format!(
            "{}.backup.{}",
            self.legacy_key,
            Utc::now().format("%Y%m%dT%H%M%SZ")
        )
    }

    /// Decode the legacy blob into its raw entries
    ///
    /// `Ok(None)` means there is no legacy data at all.
    fn legacy_entries(&self) -> LedgerResult<Option<(String, Vec<serde_json::Value>)>> {
        let Some(blob) = self.storage.defaults.get(self.legacy_key)? else {
            return Ok(None);
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(&blob).map_err(|e| {
            LedgerError::Migration(format!("Legacy versions are not a JSON array: {}", e))
        })?;

        Ok(Some((blob, entries)))
    }

    /// True when a non-empty legacy blob exists and decodes
    pub fn needs_migration(&self) -> bool {
        match self.legacy_entries() {
            Ok(Some((_, entries))) => !entries.is_empty(),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "legacy versions could not be read");
                false
            }
        }
    }

    /// Copy every legacy version not yet in the repository
    ///
    /// New records are saved in one commit. If that save fails the repository
    /// is reloaded from disk, dropping the staged records, and the error is
    /// returned so the next start retries.
    pub fn migrate(&self) -> LedgerResult<MigrationReport> {
        let mut report = MigrationReport::default();
        let Some((blob, entries)) = self.legacy_entries()? else {
            return Ok(report);
        };

        for (index, entry) in entries.into_iter().enumerate() {
            let version: BudgetVersion = match serde_json::from_value(entry) {
                Ok(version) => version,
                Err(e) => {
                    warn!(index, error = %e, "skipping undecodable legacy version");
                    report.failed += 1;
                    continue;
                }
            };

            if self.storage.versions.exists(version.id)? {
                report.skipped += 1;
                continue;
            }

            let record = match VersionRecord::from_version(&version) {
                Ok(record) => record,
                Err(e) => {
                    warn!(version = %version.id, error = %e, "failed to convert legacy version");
                    report.failed += 1;
                    continue;
                }
            };

            if self.storage.versions.insert_if_absent(record)? {
                report.migrated += 1;
            } else {
                report.skipped += 1;
            }
        }

        if report.migrated == 0 {
            return Ok(report);
        }

        if let Err(e) = self.storage.versions.save() {
            self.storage.versions.load()?;
            return Err(LedgerError::Migration(format!(
                "Failed to save migrated versions: {}",
                e
            )));
        }

        let backup_key = self.backup_key();
        match self.storage.defaults.set(&backup_key, blob) {
            Ok(()) => report.backup_key = Some(backup_key),
            Err(e) => warn!(error = %e, "migrated versions but could not back up legacy data"),
        }

        info!(
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            "legacy version migration finished"
        );
        Ok(report)
    }

    /// Compare legacy and relational counts without changing anything
    pub fn verify(&self) -> LedgerResult<VerificationReport> {
        let legacy_count = match self.legacy_entries() {
            Ok(Some((_, entries))) => entries.len(),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "legacy versions could not be read");
                0
            }
        };
        let relational_count = self.storage.versions.count()?;

        Ok(VerificationReport {
            legacy_count,
            relational_count,
            passed: legacy_count == 0 || relational_count >= legacy_count,
        })
    }

    /// Backups written by earlier migrations, oldest first
    pub fn backups(&self) -> LedgerResult<Vec<String>> {
        self.storage
            .defaults
            .keys_with_prefix(&format!("{}.backup.", self.legacy_key))
    }
}
