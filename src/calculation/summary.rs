//! Budget summaries over the parent/child line item hierarchy

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{BudgetCategory, BudgetLineItem, CustomCategory};

/// Totals per top-level budget category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub above_the_line_total: f64,
    pub below_the_line_total: f64,
    pub post_production_total: f64,
    pub other_total: f64,
}

impl BudgetSummary {
    /// The bucket total for `category`
    pub fn total_for(&self, category: BudgetCategory) -> f64 {
        match category {
            BudgetCategory::AboveTheLine => self.above_the_line_total,
            BudgetCategory::BelowTheLine => self.below_the_line_total,
            BudgetCategory::PostProduction => self.post_production_total,
            BudgetCategory::Other => self.other_total,
        }
    }

    fn add(&mut self, category: BudgetCategory, amount: f64) {
        self.total_budget += amount;
        match category {
            BudgetCategory::AboveTheLine => self.above_the_line_total += amount,
            BudgetCategory::BelowTheLine => self.below_the_line_total += amount,
            BudgetCategory::PostProduction => self.post_production_total += amount,
            BudgetCategory::Other => self.other_total += amount,
        }
    }
}

/// Totals per user-defined category, keyed by category id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomCategorySummary {
    pub total_budget: f64,
    pub category_totals: HashMap<String, f64>,
}

/// The item in `items` that `item` rolls up into, if any
pub fn parent_of<'a>(item: &BudgetLineItem, items: &'a [BudgetLineItem]) -> Option<&'a BudgetLineItem> {
    items
        .iter()
        .find(|candidate| candidate.id != item.id && candidate.is_parent_of(item))
}

fn children_of<'a>(
    item: &'a BudgetLineItem,
    items: &'a [BudgetLineItem],
) -> impl Iterator<Item = &'a BudgetLineItem> + 'a {
    items
        .iter()
        .filter(move |candidate| candidate.id != item.id && item.is_parent_of(candidate))
}

/// Cost of an item: the sum of its children's line totals when it has any,
/// otherwise quantity × days × unit cost
///
/// A parent's own amount fields never count once it has children.
pub fn effective_total(item: &BudgetLineItem, items: &[BudgetLineItem]) -> f64 {
    let mut children = children_of(item, items).peekable();
    if children.peek().is_some() {
        children.map(BudgetLineItem::line_total).sum()
    } else {
        item.line_total()
    }
}

/// Bucket the effective totals of top-level items into the four categories
///
/// Children contribute through their parent, so nothing is counted twice.
/// Children whose parent is missing from `items` are treated as top-level.
pub fn summarize(items: &[BudgetLineItem]) -> BudgetSummary {
    let mut summary = BudgetSummary::default();

    for item in items.iter().filter(|i| parent_of(i, items).is_none()) {
        let category = BudgetCategory::from_label(&item.category);
        summary.add(category, effective_total(item, items));
    }

    summary
}

/// Attribute every costed row to a user-defined category
///
/// A child is attributed by its parent's category. Categories that match no
/// defined bucket fall into the last one in `categories`, which callers use
/// as the catch-all "Other".
pub fn summarize_custom_categories(
    items: &[BudgetLineItem],
    categories: &[CustomCategory],
) -> CustomCategorySummary {
    let mut summary = CustomCategorySummary {
        total_budget: 0.0,
        category_totals: categories.iter().map(|c| (c.id.clone(), 0.0)).collect(),
    };

    for item in items {
        // Parents are represented by their children
        if children_of(item, items).next().is_some() {
            continue;
        }

        let amount = item.line_total();
        summary.total_budget += amount;

        let label = parent_of(item, items)
            .map(|parent| parent.category.as_str())
            .unwrap_or(item.category.as_str());

        let bucket = categories
            .iter()
            .find(|c| c.matches(label))
            .or_else(|| categories.last());

        if let Some(bucket) = bucket {
            *summary.category_totals.entry(bucket.id.clone()).or_insert(0.0) += amount;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchy() -> Vec<BudgetLineItem> {
        // Parent carries its own amounts, which must be ignored
        let parent = BudgetLineItem::with_amounts("Camera Dept", "Below the Line", 1.0, 1.0, 99999.0);
        let dp = BudgetLineItem::with_amounts("DP", "Below the Line", 1.0, 20.0, 1500.0)
            .as_child_of(parent.id);
        let ac = BudgetLineItem::with_amounts("1st AC", "Post Production", 1.0, 20.0, 600.0)
            .as_child_of(parent.id);
        let director = BudgetLineItem::with_amounts("Director", "Above the Line", 1.0, 1.0, 50000.0);
        let edit = BudgetLineItem::with_amounts("Editor", "Post Production", 1.0, 30.0, 800.0);
        let misc = BudgetLineItem::with_amounts("Insurance", "Insurance", 1.0, 1.0, 4000.0);
        vec![parent, dp, ac, director, edit, misc]
    }

    #[test]
    fn test_parent_total_is_sum_of_children() {
        let items = hierarchy();
        let parent = &items[0];
        let children_total: f64 = items[1..3].iter().map(|c| effective_total(c, &items)).sum();

        assert_eq!(effective_total(parent, &items), 42000.0);
        assert_eq!(effective_total(parent, &items), children_total);
    }

    #[test]
    fn test_explicit_child_list_counts() {
        let mut parent = BudgetLineItem::with_amounts("Art", "Below the Line", 1.0, 1.0, 10.0);
        let child = BudgetLineItem::with_amounts("Props", "Below the Line", 2.0, 1.0, 50.0);
        parent.child_item_ids.push(child.id);
        let items = vec![parent.clone(), child];

        assert_eq!(effective_total(&parent, &items), 100.0);
        assert_eq!(summarize(&items).total_budget, 100.0);
    }

    #[test]
    fn test_summarize_buckets() {
        let items = hierarchy();
        let summary = summarize(&items);

        assert_eq!(summary.above_the_line_total, 50000.0);
        // the 1st AC rolls into its parent's bucket
        assert_eq!(summary.below_the_line_total, 42000.0);
        assert_eq!(summary.post_production_total, 24000.0);
        assert_eq!(summary.other_total, 4000.0);
        assert_eq!(summary.total_budget, 120000.0);
        assert_eq!(summary.total_for(BudgetCategory::Other), 4000.0);
    }

    #[test]
    fn test_total_matches_top_level_effective_totals() {
        let items = hierarchy();
        let expected: f64 = items
            .iter()
            .filter(|i| parent_of(i, &items).is_none())
            .map(|i| effective_total(i, &items))
            .sum();
        assert_eq!(summarize(&items).total_budget, expected);
    }

    #[test]
    fn test_orphan_child_counts_as_top_level() {
        let orphan = BudgetLineItem::with_amounts("Orphan", "Above the Line", 1.0, 1.0, 10.0)
            .as_child_of(crate::models::LineItemId::new());
        let summary = summarize(&[orphan]);
        assert_eq!(summary.above_the_line_total, 10.0);
    }

    #[test]
    fn test_custom_categories_use_parent_and_fallback() {
        let items = hierarchy();
        let categories = vec![
            CustomCategory::new("atl", "Above the Line"),
            CustomCategory::new("btl", "Below the Line"),
            CustomCategory::new("post", "Post Production"),
            CustomCategory::new("other", "Other"),
        ];

        let summary = summarize_custom_categories(&items, &categories);

        assert_eq!(summary.total_budget, 120000.0);
        assert_eq!(summary.category_totals["atl"], 50000.0);
        assert_eq!(summary.category_totals["btl"], 42000.0);
        assert_eq!(summary.category_totals["post"], 24000.0);
        // "Insurance" matches nothing and lands in the last bucket
        assert_eq!(summary.category_totals["other"], 4000.0);
    }

    #[test]
    fn test_custom_categories_empty_list() {
        let items = hierarchy();
        let summary = summarize_custom_categories(&items, &[]);
        assert_eq!(summary.total_budget, 120000.0);
        assert!(summary.category_totals.is_empty());
    }
}
