//! Budget vs. actual variance

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::summary::{effective_total, summarize};
use crate::models::{BudgetCategory, BudgetLineItem, BudgetTransaction, LineItemId};
use crate::validation::sanitize_numeric;

/// Spend status by percentage of budget used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// 75% or less used
    OnTrack,
    /// Over 75%
    Warning,
    /// Over 90%
    NearLimit,
    /// Over 100%
    OverBudget,
}

impl VarianceStatus {
    fn from_percentage_used(percentage_used: f64) -> Self {
        if percentage_used > 100.0 {
            Self::OverBudget
        } else if percentage_used > 90.0 {
            Self::NearLimit
        } else if percentage_used > 75.0 {
            Self::Warning
        } else {
            Self::OnTrack
        }
    }
}

impl fmt::Display for VarianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "On Track"),
            Self::Warning => write!(f, "Warning"),
            Self::NearLimit => write!(f, "Near Limit"),
            Self::OverBudget => write!(f, "Over Budget"),
        }
    }
}

/// Budgeted vs. actual for one scope
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Variance {
    pub budgeted: f64,
    pub actual: f64,
    /// budgeted - actual; negative means overspent
    pub variance: f64,
    pub percentage_used: f64,
    pub percentage_remaining: f64,
    pub status: VarianceStatus,
}

impl Variance {
    pub fn is_over_budget(&self) -> bool {
        self.status == VarianceStatus::OverBudget
    }
}

/// Compare budgeted to actual
///
/// With nothing budgeted the percentage used is 0 and the status is
/// `OnTrack` whatever the actual spend. Non-finite inputs are treated as 0.
pub fn calculate_variance(budgeted: f64, actual: f64) -> Variance {
    let budgeted = sanitize_numeric(budgeted, true);
    let actual = sanitize_numeric(actual, true);

    let percentage_used = if budgeted > 0.0 {
        actual / budgeted * 100.0
    } else {
        0.0
    };

    Variance {
        budgeted,
        actual,
        variance: budgeted - actual,
        percentage_used,
        percentage_remaining: 100.0 - percentage_used,
        status: VarianceStatus::from_percentage_used(percentage_used),
    }
}

/// Variance per line item; actual is the sum of expenses linked to it
///
/// Income linked to an item is ignored, matching the spend ceiling that
/// `add_transaction` enforces.
pub fn calculate_item_variances(
    items: &[BudgetLineItem],
    transactions: &[BudgetTransaction],
) -> HashMap<LineItemId, Variance> {
    items
        .iter()
        .map(|item| {
            let actual: f64 = transactions
                .iter()
                .filter(|tx| tx.is_expense() && tx.line_item_id == Some(item.id))
                .map(|tx| tx.amount)
                .sum();
            (item.id, calculate_variance(effective_total(item, items), actual))
        })
        .collect()
}

/// Variance per top-level category
///
/// Expenses are attributed through `BudgetCategory::from_transaction_category`;
/// income is not counted. Every category is present in the result.
pub fn calculate_category_variances(
    items: &[BudgetLineItem],
    transactions: &[BudgetTransaction],
) -> HashMap<BudgetCategory, Variance> {
    let summary = summarize(items);

    let mut actuals: HashMap<BudgetCategory, f64> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let category = BudgetCategory::from_transaction_category(&tx.category);
        *actuals.entry(category).or_insert(0.0) += tx.amount;
    }

    BudgetCategory::all()
        .iter()
        .map(|&category| {
            let actual = actuals.get(&category).copied().unwrap_or(0.0);
            (category, calculate_variance(summary.total_for(category), actual))
        })
        .collect()
}
