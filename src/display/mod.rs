//! Display formatting for terminal output
//!
//! Formats versions, summaries, payroll and rate cards as tables and detail
//! views. Every formatter returns a `String`; printing is left to the CLI.

pub mod payroll;
pub mod rate_card;
pub mod summary;
pub mod version;

pub use payroll::{format_payments_due, format_payroll_list, format_payroll_summary};
pub use rate_card::format_rate_card_list;
pub use summary::{format_budget_summary, format_category_variances, format_projection};
pub use version::{format_version_details, format_version_list};
