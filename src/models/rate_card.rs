//! Rate card model
//!
//! A shared unit price that line items can link to and copy from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::RateCardId;

/// A reusable unit rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub id: RateCardId,

    pub name: String,

    #[serde(default)]
    pub category: String,

    /// Unit the rate is quoted in ("day", "week", "flat")
    #[serde(default)]
    pub default_unit: String,

    pub default_rate: f64,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl RateCard {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        default_unit: impl Into<String>,
        default_rate: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RateCardId::new(),
            name: name.into(),
            category: category.into(),
            default_unit: default_unit.into(),
            default_rate,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for RateCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}/{})", self.name, self.default_rate, self.default_unit)
    }
}
