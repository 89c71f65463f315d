//! Budget version model
//!
//! A named, independently lockable snapshot of a budget. While a version is
//! locked none of its line items, transactions or payroll items may change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::ids::{LineItemId, PayPeriodId, PayrollItemId, TransactionId, VersionId};
use super::line_item::BudgetLineItem;
use super::payroll::PayrollLineItem;
use super::transaction::BudgetTransaction;

/// Who locked a version and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    pub locked_at: DateTime<Utc>,
    pub locked_by: String,
}

/// A named budget snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetVersion {
    pub id: VersionId,

    pub name: String,

    pub created_date: DateTime<Utc>,

    #[serde(default)]
    pub is_locked: bool,

    #[serde(default)]
    pub lock_info: Option<LockInfo>,

    pub currency: String,

    #[serde(default)]
    pub notes: String,

    /// Ordered line items
    #[serde(default)]
    pub line_items: Vec<BudgetLineItem>,

    #[serde(default)]
    pub transactions: Vec<BudgetTransaction>,

    #[serde(default)]
    pub payroll_items: Vec<PayrollLineItem>,
}

impl BudgetVersion {
    /// Create an empty, unlocked version
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: VersionId::new(),
            name: name.into(),
            created_date: Utc::now(),
            is_locked: false,
            lock_info: None,
            currency: currency.into(),
            notes: String::new(),
            line_items: Vec::new(),
            transactions: Vec::new(),
            payroll_items: Vec::new(),
        }
    }

    /// Mark as locked by `actor`
    pub fn lock(&mut self, actor: impl Into<String>) {
        self.is_locked = true;
        self.lock_info = Some(LockInfo {
            locked_at: Utc::now(),
            locked_by: actor.into(),
        });
    }

    /// Clear the lock and its metadata
    pub fn unlock(&mut self) {
        self.is_locked = false;
        self.lock_info = None;
    }

    /// Line items copied structurally (names, accounts, categories, sections)
    /// with fresh ids and zeroed amounts. Parent links are remapped to the new ids.
    pub fn skeleton_line_items(&self) -> Vec<BudgetLineItem> {
        let id_map: HashMap<LineItemId, LineItemId> = self
            .line_items
            .iter()
            .map(|item| (item.id, LineItemId::new()))
            .collect();

        self.line_items
            .iter()
            .map(|item| {
                let mut copy = item.skeleton();
                copy.id = id_map[&item.id];
                copy.parent_item_id = item.parent_item_id.and_then(|p| id_map.get(&p).copied());
                copy.child_item_ids = item
                    .child_item_ids
                    .iter()
                    .filter_map(|c| id_map.get(c).copied())
                    .collect();
                copy
            })
            .collect()
    }

    /// Full copy under a new name with fresh ids everywhere
    ///
    /// Parent/child references and transaction links follow the new line
    /// item ids. The copy is unlocked.
    pub fn deep_copy(&self, name: impl Into<String>) -> Self {
        let id_map: HashMap<LineItemId, LineItemId> = self
            .line_items
            .iter()
            .map(|item| (item.id, LineItemId::new()))
            .collect();
        let remap = |id: &LineItemId| id_map.get(id).copied().unwrap_or(*id);

        let line_items = self
            .line_items
            .iter()
            .map(|item| {
                let mut copy = item.clone();
                copy.id = remap(&item.id);
                copy.parent_item_id = item.parent_item_id.as_ref().map(remap);
                copy.child_item_ids = item.child_item_ids.iter().map(remap).collect();
                copy
            })
            .collect();

        let transactions = self
            .transactions
            .iter()
            .map(|tx| {
                let mut copy = tx.clone();
                copy.id = TransactionId::new();
                copy.line_item_id = tx.line_item_id.as_ref().map(remap);
                copy
            })
            .collect();

        let payroll_items = self
            .payroll_items
            .iter()
            .map(|item| {
                let mut copy = item.clone();
                copy.id = PayrollItemId::new();
                for period in &mut copy.pay_periods {
                    period.id = PayPeriodId::new();
                }
                copy
            })
            .collect();

        Self {
            id: VersionId::new(),
            name: name.into(),
            created_date: Utc::now(),
            is_locked: false,
            lock_info: None,
            currency: self.currency.clone(),
            notes: self.notes.clone(),
            line_items,
            transactions,
            payroll_items,
        }
    }
}

impl fmt::Display for BudgetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.is_locked {
            write!(f, " [locked]")?;
        }
        Ok(())
    }
}
