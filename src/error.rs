//! Custom error types for the budget ledger
//!
//! Two layers: `ValidationError` carries the business rule that rejected a
//! mutation, and `LedgerError` wraps it together with persistence and
//! configuration failures.

use thiserror::Error;

/// A business rule that rejected a mutation
///
/// These are expected outcomes and are surfaced to the caller verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("An item with this name already exists in the same category and section")]
    DuplicateName,

    #[error("Quantity cannot be negative")]
    NegativeQuantity,

    #[error("Days cannot be negative")]
    NegativeDays,

    #[error("Unit cost cannot be negative")]
    NegativeUnitCost,

    #[error("Amount must be a positive number")]
    InvalidAmount,

    #[error("Expense date cannot be in the future")]
    FutureDate,

    #[error("Transaction exceeds the remaining budget")]
    TransactionExceedsBudget,

    #[error("Budget version is locked and cannot be modified")]
    BudgetLocked,

    #[error("Unsupported currency code")]
    InvalidCurrency,

    #[error("Start date must not be after end date")]
    InvalidDateRange,

    #[error("Account code must look like 10-00")]
    InvalidAccountCode,

    #[error("Role cannot be empty")]
    EmptyRole,

    #[error("Budgeted amount cannot be negative")]
    NegativeBudgetedAmount,

    #[error("A payroll entry with this name and role already exists")]
    DuplicatePayrollItem,

    #[error("Pay period name cannot be empty")]
    EmptyPeriodName,

    #[error("Pay amounts cannot be negative")]
    NegativePayAmount,
}

/// The main error type for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A business rule rejected the operation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Legacy data migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LedgerError {
    /// Create a "not found" error for budget versions
    pub fn version_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget version",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for payroll line items
    pub fn payroll_item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Payroll item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for pay periods
    pub fn pay_period_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Pay period",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for rate cards
    pub fn rate_card_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Rate card",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the operation was rejected because the version is locked
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::BudgetLocked))
    }

    /// The validation rule behind this error, if any
    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            Self::Validation(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
