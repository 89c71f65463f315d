//! Budget line item model
//!
//! One budgeted cost row. Items form a two-level hierarchy: a parent
//! aggregates its children and its own quantity/days/unit cost are ignored
//! once it has any.

use serde::{Deserialize, Serialize};

use super::ids::{LineItemId, RateCardId};

/// One budgeted cost row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLineItem {
    /// Unique identifier
    pub id: LineItemId,

    /// Display name
    pub name: String,

    /// Chart-of-accounts code ("10-00"), may be empty
    #[serde(default)]
    pub account: String,

    /// Category label (see `BudgetCategory::from_label`)
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub subcategory: String,

    /// Optional section label used for grouping and duplicate detection
    #[serde(default)]
    pub section: Option<String>,

    #[serde(default)]
    pub quantity: f64,

    #[serde(default)]
    pub days: f64,

    #[serde(default)]
    pub unit_cost: f64,

    #[serde(default)]
    pub notes: String,

    /// Whether unit cost tracks a rate card
    #[serde(default)]
    pub is_linked_to_rate_card: bool,

    /// The linked rate card, if any
    #[serde(default)]
    pub rate_card_id: Option<RateCardId>,

    /// Parent item (children aggregate into their parent)
    #[serde(default)]
    pub parent_item_id: Option<LineItemId>,

    /// Explicit child list; children are also discovered through `parent_item_id`
    #[serde(default)]
    pub child_item_ids: Vec<LineItemId>,
}

impl BudgetLineItem {
    /// Create a new line item with zero amounts
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: LineItemId::new(),
            name: name.into(),
            account: String::new(),
            category: category.into(),
            subcategory: String::new(),
            section: None,
            quantity: 0.0,
            days: 0.0,
            unit_cost: 0.0,
            notes: String::new(),
            is_linked_to_rate_card: false,
            rate_card_id: None,
            parent_item_id: None,
            child_item_ids: Vec::new(),
        }
    }

    /// Create a line item with quantity, days and unit cost
    pub fn with_amounts(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: f64,
        days: f64,
        unit_cost: f64,
    ) -> Self {
        let mut item = Self::new(name, category);
        item.quantity = quantity;
        item.days = days;
        item.unit_cost = unit_cost;
        item
    }

    /// Make this item a child of `parent`
    pub fn as_child_of(mut self, parent: LineItemId) -> Self {
        self.parent_item_id = Some(parent);
        self
    }

    /// quantity × days × unit cost, ignoring any children
    pub fn line_total(&self) -> f64 {
        self.quantity * self.days * self.unit_cost
    }

    /// Whether this item has no parent
    pub fn is_top_level(&self) -> bool {
        self.parent_item_id.is_none()
    }

    /// Whether `other` is a child of this item
    pub fn is_parent_of(&self, other: &BudgetLineItem) -> bool {
        other.parent_item_id == Some(self.id) || self.child_item_ids.contains(&other.id)
    }

    /// A copy keeping only the structural fields, with a fresh id and zeroed amounts
    pub fn skeleton(&self) -> Self {
        let mut item = Self::new(self.name.clone(), self.category.clone());
        item.account = self.account.clone();
        item.subcategory = self.subcategory.clone();
        item.section = self.section.clone();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = BudgetLineItem::with_amounts("Camera Operator", "Below the Line", 2.0, 10.0, 650.0);
        assert_eq!(item.line_total(), 13000.0);
    }

    #[test]
    fn test_parent_relationships() {
        let parent = BudgetLineItem::new("Camera Department", "Below the Line");
        let child = BudgetLineItem::new("Focus Puller", "Below the Line").as_child_of(parent.id);
        let stranger = BudgetLineItem::new("Caterer", "Below the Line");

        assert!(parent.is_top_level());
        assert!(!child.is_top_level());
        assert!(parent.is_parent_of(&child));
        assert!(!parent.is_parent_of(&stranger));

        let mut explicit = parent.clone();
        explicit.child_item_ids.push(stranger.id);
        assert!(explicit.is_parent_of(&stranger));
    }

    #[test]
    fn test_skeleton_resets_amounts() {
        let mut item = BudgetLineItem::with_amounts("Director", "Above the Line", 1.0, 30.0, 1200.0);
        item.account = "10-00".into();
        item.section = Some("Directing".into());
        item.rate_card_id = Some(RateCardId::new());
        item.is_linked_to_rate_card = true;

        let copy = item.skeleton();
        assert_ne!(copy.id, item.id);
        assert_eq!(copy.name, "Director");
        assert_eq!(copy.account, "10-00");
        assert_eq!(copy.section.as_deref(), Some("Directing"));
        assert_eq!(copy.line_total(), 0.0);
        assert!(!copy.is_linked_to_rate_card);
        assert!(copy.rate_card_id.is_none());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let id = LineItemId::new();
        let json = format!(r#"{{"id": "{}", "name": "Grip"}}"#, id.as_uuid());
        let item: BudgetLineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.quantity, 0.0);
        assert!(item.child_item_ids.is_empty());
    }
}
