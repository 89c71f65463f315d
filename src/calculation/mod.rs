//! Calculation engine
//!
//! Pure functions deriving summaries, variances, projections and currency
//! conversions from line items and transactions. Nothing here holds state,
//! so every function is safe to call concurrently and repeatedly.
//!
//! Degenerate inputs (NaN, infinities, zero denominators) never panic; each
//! function documents the value it falls back to.

mod currency;
mod payroll;
mod projection;
mod summary;
mod variance;

pub use currency::convert_currency;
pub use payroll::{summarize_payroll, PayrollSummary};
pub use projection::{project_remaining, Projection};
pub use summary::{
    effective_total, parent_of, summarize, summarize_custom_categories, BudgetSummary,
    CustomCategorySummary,
};
pub use variance::{
    calculate_category_variances, calculate_item_variances, calculate_variance, Variance,
    VarianceStatus,
};
