//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod line_item;
pub mod migrate;
pub mod payroll;
pub mod rate_card;
pub mod summary;
pub mod version;

pub use line_item::{
    handle_item_command, handle_transaction_command, ItemCommands, TransactionCommands,
};
pub use migrate::{handle_migrate_command, MigrateCommands};
pub use payroll::{handle_payroll_command, PayrollCommands};
pub use rate_card::{handle_rate_card_command, RateCardCommands};
pub use summary::{handle_audit_command, handle_summary_command};
pub use version::{handle_version_command, resolve_version, VersionCommands};
