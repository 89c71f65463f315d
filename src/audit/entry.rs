//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of changes that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Locked,
    Unlocked,
    Exported,
    Imported,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Created => write!(f, "CREATED"),
            AuditAction::Updated => write!(f, "UPDATED"),
            AuditAction::Deleted => write!(f, "DELETED"),
            AuditAction::Locked => write!(f, "LOCKED"),
            AuditAction::Unlocked => write!(f, "UNLOCKED"),
            AuditAction::Exported => write!(f, "EXPORTED"),
            AuditAction::Imported => write!(f, "IMPORTED"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    BudgetVersion,
    LineItem,
    Transaction,
    PayrollItem,
    PayPeriod,
    RateCard,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::BudgetVersion => write!(f, "BudgetVersion"),
            EntityType::LineItem => write!(f, "LineItem"),
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::PayrollItem => write!(f, "PayrollItem"),
            EntityType::PayPeriod => write!(f, "PayPeriod"),
            EntityType::RateCard => write!(f, "RateCard"),
        }
    }
}

/// A single audit log entry
///
/// Entries are never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,

    /// When the change was recorded (UTC), assigned at write time
    pub timestamp: DateTime<Utc>,

    pub action: AuditAction,

    pub entity_type: EntityType,

    /// ID of the affected entity
    pub entity_id: String,

    /// Human-readable description of the change
    pub detail: String,
}

impl AuditEntry {
    /// Create a new entry stamped with the current time
    pub fn new(
        action: AuditAction,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
            entity_type,
            entity_id: entity_id.into(),
            detail: detail.into(),
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.entity_type,
            self.entity_id
        );

        if !self.detail.is_empty() {
            output.push_str(&format!("\n  {}", self.detail));
        }

        output
    }
}
