//! Rate card repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::{RateCard, RateCardId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable rate card data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RateCardData {
    #[serde(default)]
    rate_cards: Vec<RateCard>,
}

/// Repository for rate card persistence
pub struct RateCardRepository {
    path: PathBuf,
    cards: RwLock<HashMap<RateCardId, RateCard>>,
}

impl RateCardRepository {
    /// Create a new rate card repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cards: RwLock::new(HashMap::new()),
        }
    }

    /// Load rate cards from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: RateCardData = read_json(&self.path)?;

        let mut cards = self
            .cards
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        cards.clear();
        for card in file_data.rate_cards {
            cards.insert(card.id, card);
        }

        Ok(())
    }

    /// Save rate cards to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let cards = self
            .cards
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut card_list: Vec<_> = cards.values().cloned().collect();
        sort_cards(&mut card_list);

        write_json_atomic(&self.path, &RateCardData { rate_cards: card_list })
    }

    /// Get a rate card by ID
    pub fn get(&self, id: RateCardId) -> Result<Option<RateCard>, LedgerError> {
        let cards = self
            .cards
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(cards.get(&id).cloned())
    }

    /// Get all rate cards ordered by category, then name
    pub fn get_all(&self) -> Result<Vec<RateCard>, LedgerError> {
        let cards = self
            .cards
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = cards.values().cloned().collect();
        sort_cards(&mut list);
        Ok(list)
    }

    /// Insert or update a rate card (in memory only)
    pub fn upsert(&self, card: RateCard) -> Result<(), LedgerError> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        cards.insert(card.id, card);
        Ok(())
    }

    /// Delete a rate card (in memory only)
    pub fn delete(&self, id: RateCardId) -> Result<bool, LedgerError> {
        let mut cards = self
            .cards
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(cards.remove(&id).is_some())
    }

    /// Count rate cards
    pub fn count(&self) -> Result<usize, LedgerError> {
        let cards = self
            .cards
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(cards.len())
    }
}

fn sort_cards(cards: &mut [RateCard]) {
    cards.sort_by(|a, b| {
        a.category
            .to_lowercase()
            .cmp(&b.category.to_lowercase())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, RateCardRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rate_cards.json");
        let repo = RateCardRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();

        let card = RateCard::new("Gaffer", "Electric", "day", 700.0);
        let id = card.id;
        repo.upsert(card).unwrap();

        let retrieved = repo.get(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Gaffer");
        assert_eq!(retrieved.default_rate, 700.0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();

        let card = RateCard::new("Key Grip", "Grip", "day", 650.0);
        let id = card.id;
        repo.upsert(card).unwrap();
        repo.save().unwrap();

        let repo2 = RateCardRepository::new(temp_dir.path().join("rate_cards.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.get(id).unwrap().unwrap().name, "Key Grip");
    }

    #[test]
    fn test_ordering() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(RateCard::new("Dolly Grip", "Grip", "day", 600.0)).unwrap();
        repo.upsert(RateCard::new("Best Boy", "Electric", "day", 550.0)).unwrap();
        repo.upsert(RateCard::new("Best Boy Grip", "Grip", "day", 560.0)).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Best Boy", "Best Boy Grip", "Dolly Grip"]);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let card = RateCard::new("Driver", "Transport", "day", 400.0);
        let id = card.id;
        repo.upsert(card).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
