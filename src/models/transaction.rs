//! Budget transaction model
//!
//! A recorded expense or income event, optionally linked to the line item
//! it was spent against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{LineItemId, TransactionId};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Expense,
    Income,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
        }
    }
}

/// One recorded expense/income event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetTransaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Date of the event
    pub date: NaiveDate,

    /// Positive amount; direction comes from `transaction_type`
    pub amount: f64,

    /// Fine-grained category label ("Catering", "VFX", ...)
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub transaction_type: TransactionType,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub payee: String,

    #[serde(default)]
    pub notes: String,

    /// The line item this was spent against
    #[serde(default)]
    pub line_item_id: Option<LineItemId>,
}

impl BudgetTransaction {
    /// Create a new expense
    pub fn expense(date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            date,
            amount,
            category: category.into(),
            transaction_type: TransactionType::Expense,
            description: String::new(),
            payee: String::new(),
            notes: String::new(),
            line_item_id: None,
        }
    }

    /// Create a new income entry
    pub fn income(date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        Self {
            transaction_type: TransactionType::Income,
            ..Self::expense(date, amount, category)
        }
    }

    /// Link this transaction to a line item
    pub fn linked_to(mut self, item: LineItemId) -> Self {
        self.line_item_id = Some(item);
        self
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}
