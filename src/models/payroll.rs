//! Payroll models
//!
//! A payroll line item is one person/role with a budgeted total and an
//! ordered list of pay periods.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{PayPeriodId, PayrollItemId};

/// Kind of contact a payroll entry is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Cast,
    #[default]
    Crew,
    Vendor,
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cast => write!(f, "Cast"),
            Self::Crew => write!(f, "Crew"),
            Self::Vendor => write!(f, "Vendor"),
        }
    }
}

/// Payment workflow: pending -> approved -> paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Paid,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Paid => write!(f, "Paid"),
        }
    }
}

/// One payroll cycle for a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollPayPeriod {
    pub id: PayPeriodId,

    /// Display name ("Week 1")
    pub period_name: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub gross_amount: f64,

    #[serde(default)]
    pub deductions: f64,

    /// gross - deductions
    pub net_amount: f64,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub payment_date: Option<NaiveDate>,

    #[serde(default)]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub notes: String,
}

impl PayrollPayPeriod {
    /// Create a pending pay period; net is computed from gross and deductions
    pub fn new(
        period_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        gross_amount: f64,
        deductions: f64,
    ) -> Self {
        Self {
            id: PayPeriodId::new(),
            period_name: period_name.into(),
            start_date,
            end_date,
            gross_amount,
            deductions,
            net_amount: gross_amount - deductions,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            payment_method: None,
            notes: String::new(),
        }
    }

    /// Set the scheduled payment date
    pub fn with_payment_date(mut self, date: NaiveDate) -> Self {
        self.payment_date = Some(date);
        self
    }

    /// Recompute net from gross and deductions
    pub fn recalculate_net(&mut self) {
        self.net_amount = self.gross_amount - self.deductions;
    }
}

/// One person/role payroll record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollLineItem {
    pub id: PayrollItemId,

    pub person_name: String,

    pub role: String,

    #[serde(default)]
    pub department: String,

    #[serde(default)]
    pub contact_type: ContactType,

    /// Id of the person in the external contacts book
    #[serde(default)]
    pub contact_id: Option<String>,

    /// Total budgeted for this person
    pub total_budgeted: f64,

    #[serde(default)]
    pub pay_periods: Vec<PayrollPayPeriod>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl PayrollLineItem {
    /// Create a new payroll entry with no pay periods
    pub fn new(
        person_name: impl Into<String>,
        role: impl Into<String>,
        department: impl Into<String>,
        contact_type: ContactType,
        total_budgeted: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PayrollItemId::new(),
            person_name: person_name.into(),
            role: role.into(),
            department: department.into(),
            contact_type,
            contact_id: None,
            total_budgeted,
            pay_periods: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of net amounts over paid periods
    pub fn total_paid(&self) -> f64 {
        self.pay_periods
            .iter()
            .filter(|p| p.payment_status.is_paid())
            .map(|p| p.net_amount)
            .sum()
    }

    /// Budgeted minus paid
    pub fn remaining_balance(&self) -> f64 {
        self.total_budgeted - self.total_paid()
    }

    /// Find a pay period by id
    pub fn period(&self, id: PayPeriodId) -> Option<&PayrollPayPeriod> {
        self.pay_periods.iter().find(|p| p.id == id)
    }

    /// Find a pay period by id for mutation
    pub fn period_mut(&mut self, id: PayPeriodId) -> Option<&mut PayrollPayPeriod> {
        self.pay_periods.iter_mut().find(|p| p.id == id)
    }

    /// Mark as modified
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
