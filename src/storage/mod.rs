//! Storage layer for the budget ledger
//!
//! JSON file storage with atomic writes and automatic directory creation.

pub mod file_io;
pub mod kv;
pub mod rate_cards;
pub mod versions;

pub use file_io::{read_json, write_json_atomic};
pub use kv::KeyValueStore;
pub use rate_cards::RateCardRepository;
pub use versions::{VersionRecord, VersionRepository};

use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub versions: VersionRepository,
    pub rate_cards: RateCardRepository,
    pub defaults: KeyValueStore,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            versions: VersionRepository::new(paths.versions_file()),
            rate_cards: RateCardRepository::new(paths.rate_cards_file()),
            defaults: KeyValueStore::new(paths.defaults_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), LedgerError> {
        self.versions.load()?;
        self.rate_cards.load()?;
        self.defaults.load()?;
        Ok(())
    }
}
