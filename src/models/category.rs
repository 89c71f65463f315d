//! Budget categories
//!
//! Line items are bucketed into four top-level categories. Transactions use
//! finer-grained labels that roll up onto those four through a fixed mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level budget category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    AboveTheLine,
    BelowTheLine,
    PostProduction,
    Other,
}

impl BudgetCategory {
    /// All categories in display order
    pub fn all() -> &'static [BudgetCategory] {
        &[
            Self::AboveTheLine,
            Self::BelowTheLine,
            Self::PostProduction,
            Self::Other,
        ]
    }

    /// Parse a line item category label; unrecognized labels fall into `Other`
    pub fn from_label(label: &str) -> Self {
        match normalize(label).as_str() {
            "abovetheline" | "atl" => Self::AboveTheLine,
            "belowtheline" | "btl" => Self::BelowTheLine,
            "postproduction" | "post" => Self::PostProduction,
            _ => Self::Other,
        }
    }

    /// Map a transaction category label onto its budget category
    ///
    /// Exact top-level labels are accepted as well.
    pub fn from_transaction_category(label: &str) -> Self {
        let key = normalize(label);
        match key.as_str() {
            "cast" | "talent" | "writers" | "writer" | "producers" | "producer" | "director"
            | "storyandrights" | "rights" => Self::AboveTheLine,
            "crew" | "camera" | "grip" | "electric" | "lighting" | "art" | "artdepartment"
            | "set" | "props" | "wardrobe" | "hairandmakeup" | "makeup" | "locations"
            | "transportation" | "catering" | "equipment" | "production" | "productionsound" => {
                Self::BelowTheLine
            }
            "editing" | "vfx" | "visualeffects" | "color" | "colorgrading" | "music"
            | "soundmixing" | "postsound" | "deliverables" => Self::PostProduction,
            _ => Self::from_label(label),
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::AboveTheLine => "Above the Line",
            Self::BelowTheLine => "Below the Line",
            Self::PostProduction => "Post Production",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for BudgetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A user-defined summary bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCategory {
    pub id: String,
    pub name: String,
}

impl CustomCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether a line item category label belongs to this bucket (id or name, case-insensitive)
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        self.id.eq_ignore_ascii_case(label) || self.name.trim().eq_ignore_ascii_case(label)
    }
}

/// Lowercase and drop separators: "Above-the Line" -> "abovetheline", "&" -> "and"
fn normalize(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_variants() {
        assert_eq!(BudgetCategory::from_label("Above the Line"), BudgetCategory::AboveTheLine);
        assert_eq!(BudgetCategory::from_label("above_the_line"), BudgetCategory::AboveTheLine);
        assert_eq!(BudgetCategory::from_label("BTL"), BudgetCategory::BelowTheLine);
        assert_eq!(BudgetCategory::from_label("Post-Production"), BudgetCategory::PostProduction);
        assert_eq!(BudgetCategory::from_label("Insurance"), BudgetCategory::Other);
        assert_eq!(BudgetCategory::from_label(""), BudgetCategory::Other);
    }

    #[test]
    fn test_transaction_category_mapping() {
        assert_eq!(
            BudgetCategory::from_transaction_category("Talent"),
            BudgetCategory::AboveTheLine
        );
        assert_eq!(
            BudgetCategory::from_transaction_category("Hair & Makeup"),
            BudgetCategory::BelowTheLine
        );
        assert_eq!(
            BudgetCategory::from_transaction_category("Catering"),
            BudgetCategory::BelowTheLine
        );
        assert_eq!(
            BudgetCategory::from_transaction_category("Visual Effects"),
            BudgetCategory::PostProduction
        );
        assert_eq!(
            BudgetCategory::from_transaction_category("Post Production"),
            BudgetCategory::PostProduction
        );
        assert_eq!(
            BudgetCategory::from_transaction_category("Office Supplies"),
            BudgetCategory::Other
        );
    }

    #[test]
    fn test_custom_category_matches() {
        let cat = CustomCategory::new("atl", "Above the Line");
        assert!(cat.matches("ATL"));
        assert!(cat.matches("above the line"));
        assert!(!cat.matches("Below the Line"));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&BudgetCategory::PostProduction).unwrap();
        assert_eq!(json, "\"post_production\"");
    }
}
