//! Service layer for the budget ledger
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, locking, audit entries and cross-entity operations.
//! `VersionManager` is the entry point; the other services are reached
//! through it or used directly for shared data such as rate cards.

pub mod migration;
pub mod payroll;
pub mod rate_card;
pub mod version;

pub use migration::{MigrationManager, MigrationReport, VerificationReport};
pub use payroll::{PaymentDue, PayrollManager, PayrollSort};
pub use rate_card::{
    link_item_to_rate_card, propagate_rate, unlink_item_from_rate_card, RateCardManager,
};
pub use version::VersionManager;
