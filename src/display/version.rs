//! Version display formatting
//!
//! Formats budget versions for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::calculation::effective_total;
use crate::models::BudgetVersion;

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format versions as a table, marking the selected one
pub fn format_version_list(versions: &[BudgetVersion], selected: Option<&BudgetVersion>) -> String {
    if versions.is_empty() {
        return "No budget versions found.\n".to_string();
    }

    let rows = versions.iter().map(|v| VersionRow {
        marker: if selected.map(|s| s.id) == Some(v.id) { "*" } else { "" },
        id: v.id.to_string(),
        name: v.name.clone(),
        created: v.created_date.format("%Y-%m-%d %H:%M").to_string(),
        currency: v.currency.clone(),
        items: v.line_items.len(),
        status: if v.is_locked { "Locked".into() } else { "Open".into() },
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

/// Format a single version's details and line items
pub fn format_version_details(version: &BudgetVersion) -> String {
    let mut output = String::new();

    output.push_str(&format!("Version: {}\n", version.name));
    output.push_str(&format!("  ID:           {}\n", version.id));
    output.push_str(&format!(
        "  Created:      {}\n",
        version.created_date.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!("  Currency:     {}\n", version.currency));
    match &version.lock_info {
        Some(lock) => output.push_str(&format!(
            "  Locked:       {} by {}\n",
            lock.locked_at.format("%Y-%m-%d %H:%M UTC"),
            lock.locked_by
        )),
        None => output.push_str("  Locked:       No\n"),
    }
    output.push_str(&format!("  Line items:   {}\n", version.line_items.len()));
    output.push_str(&format!("  Transactions: {}\n", version.transactions.len()));
    output.push_str(&format!("  Payroll:      {}\n", version.payroll_items.len()));
    if !version.notes.is_empty() {
        output.push_str(&format!("  Notes:        {}\n", version.notes));
    }

    if version.line_items.is_empty() {
        return output;
    }

    output.push('\n');
    for item in version.line_items.iter().filter(|i| i.is_top_level()) {
        output.push_str(&format!(
            "  {:<8} {:<30} {:>14.2}  {}\n",
            item.account,
            item.name,
            effective_total(item, &version.line_items),
            item.category
        ));
        for child in version.line_items.iter().filter(|c| item.is_parent_of(c)) {
            output.push_str(&format!(
                "  {:<8}   {:<28} {:>14.2}\n",
                child.account,
                child.name,
                child.line_total()
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetLineItem;

    #[test]
    fn test_list_marks_selected() {
        let a = BudgetVersion::new("Prep", "USD");
        let mut b = BudgetVersion::new("Shoot", "USD");
        b.lock("Producer");

        let output = format_version_list(&[a.clone(), b], Some(&a));
        assert!(output.contains("Prep"));
        assert!(output.contains("Locked"));
        assert!(output.contains('*'));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_version_list(&[], None), "No budget versions found.\n");
    }

    #[test]
    fn test_details_show_hierarchy() {
        let mut version = BudgetVersion::new("Shoot", "USD");
        let parent = BudgetLineItem::new("Camera", "Below the Line");
        let child = BudgetLineItem::with_amounts("DP", "Below the Line", 1.0, 2.0, 100.0)
            .as_child_of(parent.id);
        version.line_items = vec![parent, child];

        let output = format_version_details(&version);
        assert!(output.contains("Version: Shoot"));
        assert!(output.contains("Locked:       No"));
        assert!(output.contains("200.00"));
        assert!(output.contains("DP"));
    }
}
