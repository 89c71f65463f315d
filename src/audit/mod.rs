//! Audit trail for the budget ledger
//!
//! Records every create, update, delete, lock and unlock in an append-only
//! log.
//!
//! # Architecture
//!
//! - `AuditEntry`: one immutable record with timestamp, action, entity
//!   information and a human-readable detail string.
//! - `AuditLogger`: appends entries to the audit log file as line-delimited
//!   JSON (JSONL). Appends are serialized internally, so one logger can be
//!   shared through an `Arc` by every manager in the process.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ledger::audit::{AuditAction, AuditLogger, EntityType};
//!
//! let audit = Arc::new(AuditLogger::new(paths.audit_log()));
//! audit.record_change(
//!     AuditAction::Locked,
//!     EntityType::BudgetVersion,
//!     version.id.to_string(),
//!     "Locked 'Shooting Budget v2'",
//! )?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditAction, AuditEntry, EntityType};
pub use logger::AuditLogger;
