//! Core data models for the budget ledger
//!
//! Budget versions and the collections they own (line items, transactions,
//! payroll), plus shared rate cards and category definitions.

pub mod category;
pub mod ids;
pub mod line_item;
pub mod payroll;
pub mod rate_card;
pub mod transaction;
pub mod version;

pub use category::{BudgetCategory, CustomCategory};
pub use ids::{LineItemId, PayPeriodId, PayrollItemId, RateCardId, TransactionId, VersionId};
pub use line_item::BudgetLineItem;
pub use payroll::{ContactType, PaymentStatus, PayrollLineItem, PayrollPayPeriod};
pub use rate_card::RateCard;
pub use transaction::{BudgetTransaction, TransactionType};
pub use version::{BudgetVersion, LockInfo};
