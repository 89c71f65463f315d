//! Validation layer
//!
//! Pure, stateless gates that run before any mutation is committed. Each
//! returns `Ok(())` or the `ValidationError` naming the rule that failed;
//! callers decide whether to log or surface it.

mod currency;
mod numeric;

pub use currency::{is_supported_currency, validate_currency, ISO_4217_CODES};
pub use numeric::{clamp, round_to_currency, sanitize_numeric};

use chrono::{Local, NaiveDate};

use crate::error::ValidationError;
use crate::models::{BudgetLineItem, BudgetTransaction, BudgetVersion, PayrollLineItem, PayrollPayPeriod};

/// Validate a line item against the other items in the same scope
///
/// Duplicates compare lowercased name, category and section. The item
/// itself (same id) is excluded so updates don't collide with themselves.
pub fn validate_line_item(
    item: &BudgetLineItem,
    existing: &[BudgetLineItem],
) -> Result<(), ValidationError> {
    let name = item.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let key = name.to_lowercase();
    let duplicate = existing.iter().any(|other| {
        other.id != item.id
            && other.name.trim().to_lowercase() == key
            && other.category == item.category
            && other.section == item.section
    });
    if duplicate {
        return Err(ValidationError::DuplicateName);
    }

    if item.quantity < 0.0 {
        return Err(ValidationError::NegativeQuantity);
    }
    if item.days < 0.0 {
        return Err(ValidationError::NegativeDays);
    }
    if item.unit_cost < 0.0 {
        return Err(ValidationError::NegativeUnitCost);
    }

    Ok(())
}

/// Validate a transaction using today's local date
pub fn validate_transaction(
    tx: &BudgetTransaction,
    budget_remaining: Option<f64>,
) -> Result<(), ValidationError> {
    validate_transaction_on(tx, budget_remaining, Local::now().date_naive())
}

/// Validate a transaction as of `today`
///
/// The future-date and remaining-budget checks only apply to expenses.
pub fn validate_transaction_on(
    tx: &BudgetTransaction,
    budget_remaining: Option<f64>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if !tx.amount.is_finite() || tx.amount <= 0.0 {
        return Err(ValidationError::InvalidAmount);
    }

    if tx.is_expense() {
        if tx.date > today {
            return Err(ValidationError::FutureDate);
        }
        if let Some(remaining) = budget_remaining {
            if tx.amount > remaining {
                return Err(ValidationError::TransactionExceedsBudget);
            }
        }
    }

    Ok(())
}

/// Gate for every version-scoped mutation
pub fn can_modify(version: &BudgetVersion) -> Result<(), ValidationError> {
    if version.is_locked {
        Err(ValidationError::BudgetLocked)
    } else {
        Ok(())
    }
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start > end {
        Err(ValidationError::InvalidDateRange)
    } else {
        Ok(())
    }
}

/// Empty codes are allowed; otherwise exactly two digits, a dash, two digits
pub fn validate_account_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Ok(());
    }

    let bytes = code.as_bytes();
    let valid = bytes.len() == 5
        && bytes[2] == b'-'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidAccountCode)
    }
}

pub fn validate_version_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(())
    }
}

/// Validate a payroll entry against the other entries of the version
pub fn validate_payroll_item(
    item: &PayrollLineItem,
    existing: &[PayrollLineItem],
) -> Result<(), ValidationError> {
    if item.person_name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if item.role.trim().is_empty() {
        return Err(ValidationError::EmptyRole);
    }
    if !item.total_budgeted.is_finite() {
        return Err(ValidationError::InvalidAmount);
    }
    if item.total_budgeted < 0.0 {
        return Err(ValidationError::NegativeBudgetedAmount);
    }

    let name = item.person_name.trim().to_lowercase();
    let role = item.role.trim().to_lowercase();
    let duplicate = existing.iter().any(|other| {
        other.id != item.id
            && other.person_name.trim().to_lowercase() == name
            && other.role.trim().to_lowercase() == role
    });
    if duplicate {
        return Err(ValidationError::DuplicatePayrollItem);
    }

    Ok(())
}

pub fn validate_pay_period(period: &PayrollPayPeriod) -> Result<(), ValidationError> {
    if period.period_name.trim().is_empty() {
        return Err(ValidationError::EmptyPeriodName);
    }
    validate_date_range(period.start_date, period.end_date)?;
    let amounts = [period.gross_amount, period.deductions, period.net_amount];
    if amounts.iter().any(|a| !a.is_finite()) {
        return Err(ValidationError::InvalidAmount);
    }
    if period.gross_amount < 0.0 || period.deductions < 0.0 || period.net_amount < 0.0 {
        return Err(ValidationError::NegativePayAmount);
    }
    Ok(())
}
