//! Payroll aggregation

use serde::Serialize;

use crate::models::{PaymentStatus, PayrollLineItem};

/// Totals over a set of payroll entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PayrollSummary {
    pub total_budgeted: f64,
    pub total_paid: f64,
    pub total_remaining: f64,
    pub item_count: usize,
    pub period_count: usize,
    /// Net owed on pending periods
    pub pending_amount: f64,
    /// Net owed on approved, unpaid periods
    pub approved_amount: f64,
}

/// Sum budgeted, paid and remaining across `items`
pub fn summarize_payroll<'a, I>(items: I) -> PayrollSummary
where
    I: IntoIterator<Item = &'a PayrollLineItem>,
{
    let mut summary = PayrollSummary::default();

    for item in items {
        summary.item_count += 1;
        summary.total_budgeted += item.total_budgeted;
        summary.total_paid += item.total_paid();
        summary.total_remaining += item.remaining_balance();
        summary.period_count += item.pay_periods.len();

        for period in &item.pay_periods {
            match period.payment_status {
                PaymentStatus::Pending => summary.pending_amount += period.net_amount,
                PaymentStatus::Approved => summary.approved_amount += period.net_amount,
                PaymentStatus::Paid => {}
            }
        }
    }

    summary
}
