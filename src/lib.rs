//! Budget Ledger - versioned production budgets from the terminal
//!
//! This library provides the core functionality for the budget ledger. A
//! production keeps several named budget versions; each version owns its
//! line items, transactions and payroll, and can be locked once approved.
//! Rate cards are shared across versions and push their rates into the
//! line items linked to them.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (versions, line items, transactions, payroll, rate cards)
//! - `validation`: Rules checked before any change is committed
//! - `calculation`: Summaries, variances and projections
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ledger::audit::AuditLogger;
//! use ledger::config::{LedgerPaths, Settings};
//! use ledger::services::VersionManager;
//! use ledger::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let audit = Arc::new(AuditLogger::new(paths.audit_log()));
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let mut versions = VersionManager::new(&storage, &settings, audit);
//! versions.start()?;
//! ```

pub mod audit;
pub mod calculation;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
