//! Budget summary display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::calculation::{BudgetSummary, Projection, Variance};
use crate::models::BudgetCategory;

#[derive(Tabled)]
struct VarianceRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Budgeted")]
    budgeted: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Variance")]
    variance: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format category totals
pub fn format_budget_summary(summary: &BudgetSummary, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget Summary ({})\n", currency));
    output.push_str(&format!("{:-<40}\n", ""));
    for &category in BudgetCategory::all() {
        output.push_str(&format!(
            "  {:<20} {:>16.2}\n",
            category.label(),
            summary.total_for(category)
        ));
    }
    output.push_str(&format!("{:-<40}\n", ""));
    output.push_str(&format!("  {:<20} {:>16.2}\n", "Total", summary.total_budget));

    output
}

/// Format budgeted vs actual per category
pub fn format_category_variances(variances: &[(BudgetCategory, Variance)]) -> String {
    let rows = variances.iter().map(|(category, v)| VarianceRow {
        category: category.label().to_string(),
        budgeted: format!("{:.2}", v.budgeted),
        actual: format!("{:.2}", v.actual),
        variance: format!("{:.2}", v.variance),
        used: format!("{:.1}%", v.percentage_used),
        status: v.status.to_string(),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

/// Format a spend projection
pub fn format_projection(projection: &Projection) -> String {
    let mut output = String::new();

    output.push_str("Projection\n");
    output.push_str(&format!("  Daily rate:          {:.2}\n", projection.daily_rate));
    output.push_str(&format!("  Projected total:     {:.2}\n", projection.projected_total));
    output.push_str(&format!(
        "  Projected remaining: {:.2}\n",
        projection.projected_remaining
    ));
    output.push_str(&format!("  Days remaining:      {}\n", projection.days_remaining));
    output.push_str(&format!(
        "  On track:            {}\n",
        if projection.on_track { "Yes" } else { "No" }
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{calculate_variance, project_remaining};

    #[test]
    fn test_summary_lists_every_category() {
        let summary = BudgetSummary {
            total_budget: 1500.0,
            above_the_line_total: 1000.0,
            below_the_line_total: 500.0,
            ..Default::default()
        };

        let output = format_budget_summary(&summary, "USD");
        assert!(output.contains("Budget Summary (USD)"));
        assert!(output.contains("1500.00"));
        assert_eq!(output.lines().count(), 8);
    }

    #[test]
    fn test_variance_table() {
        let rows = vec![(BudgetCategory::Other, calculate_variance(100.0, 120.0))];
        let output = format_category_variances(&rows);
        assert!(output.contains("Over Budget"));
        assert!(output.contains("120.0%"));
    }

    #[test]
    fn test_projection() {
        let output = format_projection(&project_remaining(1000.0, 200.0, 0, 10));
        assert!(output.contains("Projected remaining: 800.00"));
        assert!(output.contains("On track:            Yes"));
    }
}
