//! Rate card service
//!
//! CRUD over shared unit rates plus the explicit link/unlink/propagate
//! operations on line items. A linked item copies the card's rate once;
//! later rate changes only reach it through `update_linked_items`.

use chrono::Utc;
use tracing::warn;

use crate::audit::{AuditAction, AuditLogger, EntityType};
use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::models::{BudgetLineItem, RateCard, RateCardId};
use crate::storage::Storage;

/// Copy the card's current rate into the item and link it
pub fn link_item_to_rate_card(item: &mut BudgetLineItem, card: &RateCard) {
    item.is_linked_to_rate_card = true;
    item.rate_card_id = Some(card.id);
    item.unit_cost = card.default_rate;
}

/// Drop the link, keeping the last copied unit cost
pub fn unlink_item_from_rate_card(item: &mut BudgetLineItem) {
    item.is_linked_to_rate_card = false;
    item.rate_card_id = None;
}

/// Overwrite the unit cost of every item linked to `card`
///
/// Returns the number of items whose cost actually changed.
pub fn propagate_rate(card: &RateCard, items: &mut [BudgetLineItem]) -> usize {
    let mut changed = 0;
    for item in items
        .iter_mut()
        .filter(|i| i.is_linked_to_rate_card && i.rate_card_id == Some(card.id))
    {
        if item.unit_cost != card.default_rate {
            item.unit_cost = card.default_rate;
            changed += 1;
        }
    }
    changed
}

fn validate_card(card: &RateCard) -> Result<(), ValidationError> {
    if card.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !card.default_rate.is_finite() {
        return Err(ValidationError::InvalidAmount);
    }
    if card.default_rate < 0.0 {
        return Err(ValidationError::NegativeUnitCost);
    }
    Ok(())
}

/// Service for rate card management
pub struct RateCardManager<'a> {
    storage: &'a Storage,
    audit: &'a AuditLogger,
}

impl<'a> RateCardManager<'a> {
    pub fn new(storage: &'a Storage, audit: &'a AuditLogger) -> Self {
        Self { storage, audit }
    }

    /// Create a new rate card
    pub fn create(
        &self,
        name: &str,
        category: &str,
        default_unit: &str,
        default_rate: f64,
    ) -> LedgerResult<RateCard> {
        let card = RateCard::new(name.trim(), category.trim(), default_unit.trim(), default_rate);
        validate_card(&card)?;

        if self.find_by_name(&card.name)?.is_some() {
            return Err(ValidationError::DuplicateName.into());
        }

        self.persist(card.clone(), None)?;
        self.record(
            AuditAction::Created,
            &card,
            format!("Created rate card {}", card),
        );

        Ok(card)
    }

    /// Update an existing card's fields
    pub fn update(&self, mut card: RateCard) -> LedgerResult<RateCard> {
        validate_card(&card)?;
        let before = self
            .storage
            .rate_cards
            .get(card.id)?
            .ok_or_else(|| LedgerError::rate_card_not_found(card.id.to_string()))?;

        card.created_at = before.created_at;
        card.updated_at = Utc::now();
        self.persist(card.clone(), Some(before.clone()))?;

        let detail = if before.default_rate != card.default_rate {
            format!(
                "{}: rate {:.2} -> {:.2}",
                card.name, before.default_rate, card.default_rate
            )
        } else {
            format!("Updated rate card {}", card.name)
        };
        self.record(AuditAction::Updated, &card, detail);

        Ok(card)
    }

    /// Delete a rate card; linked items keep their copied cost
    pub fn delete(&self, id: RateCardId) -> LedgerResult<RateCard> {
        let card = self
            .storage
            .rate_cards
            .get(id)?
            .ok_or_else(|| LedgerError::rate_card_not_found(id.to_string()))?;

        self.storage.rate_cards.delete(id)?;
        if let Err(e) = self.storage.rate_cards.save() {
            self.storage.rate_cards.upsert(card)?;
            return Err(e);
        }

        self.record(
            AuditAction::Deleted,
            &card,
            format!("Deleted rate card {}", card.name),
        );
        Ok(card)
    }

    pub fn get(&self, id: RateCardId) -> LedgerResult<Option<RateCard>> {
        self.storage.rate_cards.get(id)
    }

    /// All cards ordered by category, then name
    pub fn list(&self) -> LedgerResult<Vec<RateCard>> {
        self.storage.rate_cards.get_all()
    }

    pub fn list_by_category(&self, category: &str) -> LedgerResult<Vec<RateCard>> {
        let category = category.trim();
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.category.eq_ignore_ascii_case(category))
            .collect())
    }

    /// Case-insensitive name lookup
    pub fn find_by_name(&self, name: &str) -> LedgerResult<Option<RateCard>> {
        let name = name.trim().to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .find(|c| c.name.to_lowercase() == name))
    }

    /// Find a card by name or ID
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<RateCard>> {
        if let Some(card) = self.find_by_name(identifier)? {
            return Ok(Some(card));
        }

        if let Ok(id) = identifier.parse::<RateCardId>() {
            return self.get(id);
        }

        Ok(self.list()?.into_iter().find(|c| c.id.matches(identifier)))
    }

    /// Propagate the card's current rate into the linked items
    pub fn update_linked_items(
        &self,
        card_id: RateCardId,
        items: &mut [BudgetLineItem],
    ) -> LedgerResult<usize> {
        let card = self
            .get(card_id)?
            .ok_or_else(|| LedgerError::rate_card_not_found(card_id.to_string()))?;
        Ok(propagate_rate(&card, items))
    }

    fn persist(&self, card: RateCard, previous: Option<RateCard>) -> LedgerResult<()> {
        let id = card.id;
        self.storage.rate_cards.upsert(card)?;

        if let Err(e) = self.storage.rate_cards.save() {
            match previous {
                Some(previous) => self.storage.rate_cards.upsert(previous)?,
                None => {
                    self.storage.rate_cards.delete(id)?;
                }
            }
            return Err(e);
        }

        Ok(())
    }

    fn record(&self, action: AuditAction, card: &RateCard, detail: String) {
        if let Err(e) =
            self.audit
                .record_change(action, EntityType::RateCard, card.id.to_string(), detail)
        {
            warn!(error = %e, "failed to append rate card audit entry");
        }
    }
}
