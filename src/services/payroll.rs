//! Payroll service
//!
//! Owns the working set of payroll entries for one budget version. Every
//! mutation is gated by the version lock, validated and stamps `updated_at`
//! on the entry it touched. Audit entries are queued with the working set;
//! persisting both is the caller's job (see `VersionManager::edit_payroll`),
//! so an edit that is never committed leaves no trace in the audit log.

use std::collections::BTreeSet;

use chrono::{Duration, Local, NaiveDate};
use tracing::warn;

use crate::audit::{AuditAction, AuditEntry, EntityType};
use crate::calculation::{summarize_payroll, PayrollSummary};
use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::models::{
    BudgetVersion, ContactType, PayPeriodId, PaymentStatus, PayrollItemId, PayrollLineItem,
    PayrollPayPeriod, VersionId,
};
use crate::validation::{validate_pay_period, validate_payroll_item};

/// Sort orders for payroll listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayrollSort {
    #[default]
    NameAsc,
    NameDesc,
    BudgetedAsc,
    BudgetedDesc,
    PaidAsc,
    PaidDesc,
    RemainingAsc,
    RemainingDesc,
    Department,
    Role,
}

impl PayrollSort {
    pub fn all() -> &'static [PayrollSort] {
        &[
            Self::NameAsc,
            Self::NameDesc,
            Self::BudgetedAsc,
            Self::BudgetedDesc,
            Self::PaidAsc,
            Self::PaidDesc,
            Self::RemainingAsc,
            Self::RemainingDesc,
            Self::Department,
            Self::Role,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NameAsc => "name",
            Self::NameDesc => "name-desc",
            Self::BudgetedAsc => "budgeted",
            Self::BudgetedDesc => "budgeted-desc",
            Self::PaidAsc => "paid",
            Self::PaidDesc => "paid-desc",
            Self::RemainingAsc => "remaining",
            Self::RemainingDesc => "remaining-desc",
            Self::Department => "department",
            Self::Role => "role",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

/// A scheduled payment: one pay period together with its entry
#[derive(Debug, Clone, Copy)]
pub struct PaymentDue<'a> {
    pub item: &'a PayrollLineItem,
    pub period: &'a PayrollPayPeriod,
}

/// Payroll working set for a single version
pub struct PayrollManager {
    version_id: VersionId,
    locked: bool,
    items: Vec<PayrollLineItem>,
    pending: Vec<AuditEntry>,
}

impl PayrollManager {
    /// Take a copy of the version's payroll entries
    pub fn for_version(version: &BudgetVersion) -> Self {
        Self {
            version_id: version.id,
            locked: version.is_locked,
            items: version.payroll_items.clone(),
            pending: Vec::new(),
        }
    }

    pub fn version_id(&self) -> VersionId {
        self.version_id
    }

    pub fn items(&self) -> &[PayrollLineItem] {
        &self.items
    }

    /// Audit entries for the edits made so far, oldest first
    pub fn pending_audit(&self) -> &[AuditEntry] {
        &self.pending
    }

    /// Split into the edited entries and the audit entries describing them
    pub fn into_parts(self) -> (Vec<PayrollLineItem>, Vec<AuditEntry>) {
        (self.items, self.pending)
    }

    pub fn get_item(&self, id: PayrollItemId) -> Option<&PayrollLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn ensure_unlocked(&self) -> LedgerResult<()> {
        if self.locked {
            return Err(ValidationError::BudgetLocked.into());
        }
        Ok(())
    }

    fn index_of(&self, id: PayrollItemId) -> LedgerResult<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| LedgerError::payroll_item_not_found(id.to_string()))
    }

    fn record(
        &mut self,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: String,
        detail: String,
    ) {
        self.pending
            .push(AuditEntry::new(action, entity_type, entity_id, detail));
    }

    /// Add a new payroll entry
    pub fn add_item(&mut self, mut item: PayrollLineItem) -> LedgerResult<PayrollItemId> {
        self.ensure_unlocked()?;
        validate_payroll_item(&item, &self.items)?;
        for period in &item.pay_periods {
            validate_pay_period(period)?;
        }

        item.touch();
        let id = item.id;
        let detail = format!("Added payroll entry for {} ({})", item.person_name, item.role);
        self.items.push(item);

        self.record(AuditAction::Created, EntityType::PayrollItem, id.to_string(), detail);
        Ok(id)
    }

    /// Replace an existing entry's fields
    pub fn update_item(&mut self, mut item: PayrollLineItem) -> LedgerResult<()> {
        self.ensure_unlocked()?;
        let index = self.index_of(item.id)?;
        validate_payroll_item(&item, &self.items)?;
        for period in &item.pay_periods {
            validate_pay_period(period)?;
        }

        let before = &self.items[index];
        let detail = if (before.total_budgeted - item.total_budgeted).abs() > f64::EPSILON {
            format!(
                "Updated {}: budgeted {:.2} -> {:.2}",
                item.person_name, before.total_budgeted, item.total_budgeted
            )
        } else {
            format!("Updated {}", item.person_name)
        };

        item.created_at = before.created_at;
        item.touch();
        let id = item.id;
        self.items[index] = item;

        self.record(AuditAction::Updated, EntityType::PayrollItem, id.to_string(), detail);
        Ok(())
    }

    pub fn delete_item(&mut self, id: PayrollItemId) -> LedgerResult<PayrollLineItem> {
        self.ensure_unlocked()?;
        let index = self.index_of(id)?;
        let removed = self.items.remove(index);

        self.record(
            AuditAction::Deleted,
            EntityType::PayrollItem,
            id.to_string(),
            format!("Deleted payroll entry for {}", removed.person_name),
        );
        Ok(removed)
    }

    /// Append a pay period to an entry; net is recomputed from gross and deductions
    pub fn add_pay_period(
        &mut self,
        item_id: PayrollItemId,
        mut period: PayrollPayPeriod,
    ) -> LedgerResult<PayPeriodId> {
        self.ensure_unlocked()?;
        let index = self.index_of(item_id)?;
        period.recalculate_net();
        validate_pay_period(&period)?;

        let period_id = period.id;
        let item = &mut self.items[index];
        let detail = format!(
            "Added {} to {} (net {:.2})",
            period.period_name, item.person_name, period.net_amount
        );
        item.pay_periods.push(period);
        item.touch();

        self.record(AuditAction::Created, EntityType::PayPeriod, period_id.to_string(), detail);
        Ok(period_id)
    }

    pub fn update_pay_period(
        &mut self,
        item_id: PayrollItemId,
        mut period: PayrollPayPeriod,
    ) -> LedgerResult<()> {
        self.ensure_unlocked()?;
        let index = self.index_of(item_id)?;
        period.recalculate_net();
        validate_pay_period(&period)?;

        let period_id = period.id;
        let item = &mut self.items[index];
        let slot = item
            .period_mut(period_id)
            .ok_or_else(|| LedgerError::pay_period_not_found(period_id.to_string()))?;
        let detail = format!("Updated {} (net {:.2})", period.period_name, period.net_amount);
        *slot = period;
        item.touch();

        self.record(AuditAction::Updated, EntityType::PayPeriod, period_id.to_string(), detail);
        Ok(())
    }

    pub fn delete_pay_period(
        &mut self,
        item_id: PayrollItemId,
        period_id: PayPeriodId,
    ) -> LedgerResult<PayrollPayPeriod> {
        self.ensure_unlocked()?;
        let index = self.index_of(item_id)?;

        let item = &mut self.items[index];
        let position = item
            .pay_periods
            .iter()
            .position(|p| p.id == period_id)
            .ok_or_else(|| LedgerError::pay_period_not_found(period_id.to_string()))?;
        let removed = item.pay_periods.remove(position);
        item.touch();
        let detail = format!("Deleted {} from {}", removed.period_name, item.person_name);

        self.record(AuditAction::Deleted, EntityType::PayPeriod, period_id.to_string(), detail);
        Ok(removed)
    }

    /// Move a pay period through the pending -> approved -> paid workflow
    pub fn update_payment_status(
        &mut self,
        item_id: PayrollItemId,
        period_id: PayPeriodId,
        status: PaymentStatus,
    ) -> LedgerResult<()> {
        self.ensure_unlocked()?;
        let index = self.index_of(item_id)?;

        let item = &mut self.items[index];
        let period = item
            .period_mut(period_id)
            .ok_or_else(|| LedgerError::pay_period_not_found(period_id.to_string()))?;
        let detail = format!(
            "{}: {} -> {}",
            period.period_name, period.payment_status, status
        );
        period.payment_status = status;
        item.touch();

        self.record(AuditAction::Updated, EntityType::PayPeriod, period_id.to_string(), detail);
        Ok(())
    }

    /// Add a copy of `template` (with a fresh id each time) to several entries
    ///
    /// Best effort: failures are logged and skipped. Returns how many entries
    /// received the period.
    pub fn add_pay_period_to_multiple_items(
        &mut self,
        item_ids: &[PayrollItemId],
        template: &PayrollPayPeriod,
    ) -> usize {
        let mut added = 0;
        for &item_id in item_ids {
            let mut period = template.clone();
            period.id = PayPeriodId::new();
            match self.add_pay_period(item_id, period) {
                Ok(_) => added += 1,
                Err(e) => warn!(item = %item_id, error = %e, "skipping pay period in batch"),
            }
        }
        added
    }

    /// Set the same status on several pay periods, best effort
    pub fn update_payment_status_for_multiple_periods(
        &mut self,
        targets: &[(PayrollItemId, PayPeriodId)],
        status: PaymentStatus,
    ) -> usize {
        let mut updated = 0;
        for &(item_id, period_id) in targets {
            match self.update_payment_status(item_id, period_id, status) {
                Ok(()) => updated += 1,
                Err(e) => warn!(period = %period_id, error = %e, "skipping status change in batch"),
            }
        }
        updated
    }

    pub fn filter_by_contact_type(&self, contact_type: ContactType) -> Vec<&PayrollLineItem> {
        self.items
            .iter()
            .filter(|i| i.contact_type == contact_type)
            .collect()
    }

    pub fn filter_by_department(&self, department: &str) -> Vec<&PayrollLineItem> {
        self.items
            .iter()
            .filter(|i| i.department.eq_ignore_ascii_case(department.trim()))
            .collect()
    }

    pub fn filter_by_contact_id(&self, contact_id: &str) -> Vec<&PayrollLineItem> {
        self.items
            .iter()
            .filter(|i| i.contact_id.as_deref() == Some(contact_id))
            .collect()
    }

    /// Case-insensitive substring match on name, role and department
    pub fn search(&self, query: &str) -> Vec<&PayrollLineItem> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.items.iter().collect();
        }

        self.items
            .iter()
            .filter(|i| {
                i.person_name.to_lowercase().contains(&query)
                    || i.role.to_lowercase().contains(&query)
                    || i.department.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Distinct non-empty departments, sorted
    pub fn departments(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|i| i.department.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn sorted(&self, sort: PayrollSort) -> Vec<&PayrollLineItem> {
        let mut items: Vec<_> = self.items.iter().collect();
        let by_name = |a: &&PayrollLineItem, b: &&PayrollLineItem| {
            a.person_name.to_lowercase().cmp(&b.person_name.to_lowercase())
        };

        match sort {
            PayrollSort::NameAsc => items.sort_by(by_name),
            PayrollSort::NameDesc => items.sort_by(|a, b| by_name(b, a)),
            PayrollSort::BudgetedAsc => {
                items.sort_by(|a, b| a.total_budgeted.total_cmp(&b.total_budgeted))
            }
            PayrollSort::BudgetedDesc => {
                items.sort_by(|a, b| b.total_budgeted.total_cmp(&a.total_budgeted))
            }
            PayrollSort::PaidAsc => items.sort_by(|a, b| a.total_paid().total_cmp(&b.total_paid())),
            PayrollSort::PaidDesc => items.sort_by(|a, b| b.total_paid().total_cmp(&a.total_paid())),
            PayrollSort::RemainingAsc => {
                items.sort_by(|a, b| a.remaining_balance().total_cmp(&b.remaining_balance()))
            }
            PayrollSort::RemainingDesc => {
                items.sort_by(|a, b| b.remaining_balance().total_cmp(&a.remaining_balance()))
            }
            PayrollSort::Department => items.sort_by(|a, b| {
                a.department
                    .to_lowercase()
                    .cmp(&b.department.to_lowercase())
                    .then_with(|| by_name(a, b))
            }),
            PayrollSort::Role => items.sort_by(|a, b| {
                a.role
                    .to_lowercase()
                    .cmp(&b.role.to_lowercase())
                    .then_with(|| by_name(a, b))
            }),
        }

        items
    }

    /// Totals over every entry
    pub fn calculate_summary(&self) -> PayrollSummary {
        summarize_payroll(&self.items)
    }

    /// Totals over a filtered subset
    pub fn calculate_summary_for<'a, I>(&self, items: I) -> PayrollSummary
    where
        I: IntoIterator<Item = &'a PayrollLineItem>,
    {
        summarize_payroll(items)
    }

    /// Unpaid periods due within `within_days` of today
    pub fn upcoming_payments(&self, within_days: i64) -> Vec<PaymentDue<'_>> {
        self.upcoming_payments_from(Local::now().date_naive(), within_days)
    }

    /// Unpaid periods whose payment date falls in `[today, today + within_days]`
    ///
    /// Periods without a payment date are included and sort last.
    pub fn upcoming_payments_from(&self, today: NaiveDate, within_days: i64) -> Vec<PaymentDue<'_>> {
        let horizon = today + Duration::days(within_days.max(0));

        let mut due: Vec<_> = self
            .unpaid()
            .filter(|d| match d.period.payment_date {
                Some(date) => date >= today && date <= horizon,
                None => true,
            })
            .collect();

        due.sort_by_key(|d| (d.period.payment_date.is_none(), d.period.payment_date));
        due
    }

    pub fn overdue_payments(&self) -> Vec<PaymentDue<'_>> {
        self.overdue_payments_as_of(Local::now().date_naive())
    }

    /// Unpaid periods whose payment date is before `today`
    ///
    /// Periods without a payment date are included and sort first.
    pub fn overdue_payments_as_of(&self, today: NaiveDate) -> Vec<PaymentDue<'_>> {
        let mut due: Vec<_> = self
            .unpaid()
            .filter(|d| d.period.payment_date.map_or(true, |date| date < today))
            .collect();

        due.sort_by_key(|d| (d.period.payment_date.is_some(), d.period.payment_date));
        due
    }

    fn unpaid(&self) -> impl Iterator<Item = PaymentDue<'_>> {
        self.items.iter().flat_map(|item| {
            item.pay_periods
                .iter()
                .filter(|p| !p.payment_status.is_paid())
                .map(move |period| PaymentDue { item, period })
        })
    }
}
