//! Payroll CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::payroll::{format_payments_due, format_payroll_list, format_payroll_summary};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{ContactType, PaymentStatus, PayrollItemId, PayrollLineItem, PayrollPayPeriod};
use crate::services::{PayrollSort, VersionManager};

/// Payroll subcommands
#[derive(Subcommand)]
pub enum PayrollCommands {
    /// List payroll entries of the selected version
    List {
        /// Sort order: name, name-desc, budgeted, budgeted-desc, paid, paid-desc,
        /// remaining, remaining-desc, department, role
        #[arg(short, long, default_value = "name")]
        sort: String,
        /// Only entries in this department
        #[arg(short, long)]
        department: Option<String>,
        /// Case-insensitive match on name, role or department
        #[arg(long)]
        search: Option<String>,
    },
    /// Show payroll totals
    Summary,
    /// Unpaid periods due soon
    Upcoming {
        /// Window in days (defaults to the configured window)
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Unpaid periods past their payment date
    Overdue,
    /// Add a payroll entry
    Add {
        name: String,
        role: String,
        #[arg(short, long, default_value = "")]
        department: String,
        /// cast, crew or vendor
        #[arg(short = 't', long, default_value = "crew")]
        contact_type: String,
        /// Total budgeted amount
        #[arg(short, long, default_value = "0")]
        budget: f64,
    },
    /// Add a pay period to an entry
    AddPeriod {
        /// Person name
        name: String,
        /// Period name ("Week 1")
        period: String,
        /// Start date (YYYY-MM-DD)
        start: String,
        /// End date (YYYY-MM-DD)
        end: String,
        gross: f64,
        #[arg(long, default_value = "0")]
        deductions: f64,
        /// Scheduled payment date (YYYY-MM-DD)
        #[arg(long)]
        pay_date: Option<String>,
    },
    /// Set the payment status of a pay period
    Status {
        /// Person name
        name: String,
        /// Period name
        period: String,
        /// pending, approved or paid
        status: String,
    },
}

fn parse_contact_type(value: &str) -> LedgerResult<ContactType> {
    match value.trim().to_lowercase().as_str() {
        "cast" => Ok(ContactType::Cast),
        "crew" => Ok(ContactType::Crew),
        "vendor" => Ok(ContactType::Vendor),
        other => Err(LedgerError::InvalidInput(format!(
            "Unknown contact type '{}'. Valid types: cast, crew, vendor",
            other
        ))),
    }
}

fn parse_status(value: &str) -> LedgerResult<PaymentStatus> {
    match value.trim().to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "approved" => Ok(PaymentStatus::Approved),
        "paid" => Ok(PaymentStatus::Paid),
        other => Err(LedgerError::InvalidInput(format!(
            "Unknown payment status '{}'. Valid statuses: pending, approved, paid",
            other
        ))),
    }
}

fn parse_day(value: &str) -> LedgerResult<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        LedgerError::InvalidInput(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", value, e))
    })
}

fn find_person(items: &[PayrollLineItem], name: &str) -> LedgerResult<PayrollItemId> {
    items
        .iter()
        .find(|i| i.person_name.eq_ignore_ascii_case(name.trim()))
        .map(|i| i.id)
        .ok_or_else(|| LedgerError::payroll_item_not_found(name))
}

/// Handle a payroll command
pub fn handle_payroll_command(
    manager: &mut VersionManager,
    settings: &Settings,
    cmd: PayrollCommands,
) -> LedgerResult<()> {
    match cmd {
        PayrollCommands::List {
            sort,
            department,
            search,
        } => {
            let sort = PayrollSort::from_label(&sort).ok_or_else(|| {
                LedgerError::InvalidInput(format!("Unknown sort order '{}'", sort))
            })?;

            let payroll = manager.payroll()?;
            let mut items = payroll.sorted(sort);
            if let Some(department) = department {
                items.retain(|i| i.department.eq_ignore_ascii_case(department.trim()));
            }
            if let Some(search) = search {
                let matches: Vec<_> = payroll.search(&search).into_iter().map(|i| i.id).collect();
                items.retain(|i| matches.contains(&i.id));
            }

            print!("{}", format_payroll_list(&items));
        }

        PayrollCommands::Summary => {
            let payroll = manager.payroll()?;
            print!("{}", format_payroll_summary(&payroll.calculate_summary()));
            let departments = payroll.departments();
            if !departments.is_empty() {
                println!("  Departments:    {}", departments.join(", "));
            }
        }

        PayrollCommands::Upcoming { days } => {
            let days = days.unwrap_or(settings.upcoming_payment_window_days);
            let payroll = manager.payroll()?;
            print!(
                "{}",
                format_payments_due(
                    &payroll.upcoming_payments(days),
                    &format!("No payments due in the next {} days.", days)
                )
            );
        }

        PayrollCommands::Overdue => {
            let payroll = manager.payroll()?;
            print!(
                "{}",
                format_payments_due(&payroll.overdue_payments(), "No overdue payments.")
            );
        }

        PayrollCommands::Add {
            name,
            role,
            department,
            contact_type,
            budget,
        } => {
            let contact_type = parse_contact_type(&contact_type)?;
            let item = PayrollLineItem::new(
                name.trim(),
                role.trim(),
                department.trim(),
                contact_type,
                budget,
            );
            manager.edit_payroll(|payroll| payroll.add_item(item))?;
            println!("Added payroll entry: {} ({})", name.trim(), role.trim());
        }

        PayrollCommands::AddPeriod {
            name,
            period,
            start,
            end,
            gross,
            deductions,
            pay_date,
        } => {
            let mut pay_period = PayrollPayPeriod::new(
                period.trim(),
                parse_day(&start)?,
                parse_day(&end)?,
                gross,
                deductions,
            );
            if let Some(pay_date) = pay_date {
                pay_period = pay_period.with_payment_date(parse_day(&pay_date)?);
            }
            let net = pay_period.net_amount;

            manager.edit_payroll(|payroll| {
                let item_id = find_person(payroll.items(), &name)?;
                payroll.add_pay_period(item_id, pay_period)
            })?;
            println!("Added {} to {} (net {:.2})", period.trim(), name.trim(), net);
        }

        PayrollCommands::Status { name, period, status } => {
            let status = parse_status(&status)?;

            manager.edit_payroll(|payroll| {
                let item_id = find_person(payroll.items(), &name)?;
                let period_id = payroll
                    .get_item(item_id)
                    .and_then(|i| {
                        i.pay_periods
                            .iter()
                            .find(|p| p.period_name.eq_ignore_ascii_case(period.trim()))
                    })
                    .map(|p| p.id)
                    .ok_or_else(|| LedgerError::pay_period_not_found(&period))?;
                payroll.update_payment_status(item_id, period_id, status)
            })?;
            println!("{} / {}: {}", name.trim(), period.trim(), status);
        }
    }

    Ok(())
}
