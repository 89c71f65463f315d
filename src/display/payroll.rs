//! Payroll display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::calculation::PayrollSummary;
use crate::models::PayrollLineItem;
use crate::services::PaymentDue;

#[derive(Tabled)]
struct PayrollRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Type")]
    contact_type: String,
    #[tabled(rename = "Budgeted")]
    budgeted: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Net")]
    net: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format payroll entries as a table
pub fn format_payroll_list(items: &[&PayrollLineItem]) -> String {
    if items.is_empty() {
        return "No payroll entries found.\n".to_string();
    }

    let rows = items.iter().map(|item| PayrollRow {
        id: item.id.to_string(),
        name: item.person_name.clone(),
        role: item.role.clone(),
        department: item.department.clone(),
        contact_type: item.contact_type.to_string(),
        budgeted: format!("{:.2}", item.total_budgeted),
        paid: format!("{:.2}", item.total_paid()),
        remaining: format!("{:.2}", item.remaining_balance()),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

pub fn format_payroll_summary(summary: &PayrollSummary) -> String {
    let mut output = String::new();

    output.push_str("Payroll Summary\n");
    output.push_str(&format!("  Entries:        {}\n", summary.item_count));
    output.push_str(&format!("  Pay periods:    {}\n", summary.period_count));
    output.push_str(&format!("  Budgeted:       {:.2}\n", summary.total_budgeted));
    output.push_str(&format!("  Paid:           {:.2}\n", summary.total_paid));
    output.push_str(&format!("  Remaining:      {:.2}\n", summary.total_remaining));
    output.push_str(&format!("  Pending:        {:.2}\n", summary.pending_amount));
    output.push_str(&format!("  Approved:       {:.2}\n", summary.approved_amount));

    output
}

/// Format scheduled payments; periods without a date show "unscheduled"
pub fn format_payments_due(payments: &[PaymentDue<'_>], empty_message: &str) -> String {
    if payments.is_empty() {
        return format!("{}\n", empty_message);
    }

    let rows = payments.iter().map(|due| PaymentRow {
        due: due
            .period
            .payment_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unscheduled".to_string()),
        name: due.item.person_name.clone(),
        period: due.period.period_name.clone(),
        net: format!("{:.2}", due.period.net_amount),
        status: due.period.payment_status.to_string(),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}
