//! Line item and transaction CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::AuditLogger;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetLineItem, BudgetTransaction};
use crate::services::{link_item_to_rate_card, RateCardManager, VersionManager};
use crate::storage::Storage;

/// Line item subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add a line item to the selected version
    Add {
        /// Item name
        name: String,
        /// Category label ("Above the Line", "Below the Line", "Post Production", ...)
        #[arg(short, long, default_value = "Other")]
        category: String,
        /// Account code (e.g. 10-00)
        #[arg(short, long, default_value = "")]
        account: String,
        #[arg(short, long, default_value = "1")]
        quantity: f64,
        #[arg(short, long, default_value = "1")]
        days: f64,
        /// Unit cost (ignored when --rate-card is given)
        #[arg(short, long, default_value = "0")]
        unit_cost: f64,
        /// Parent item name; the new item becomes its child
        #[arg(long)]
        parent: Option<String>,
        /// Rate card name or ID to link and copy the rate from
        #[arg(long)]
        rate_card: Option<String>,
    },
    /// List line items with budgeted vs actual
    List,
}

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an expense (or income with --income) against the selected version
    Add {
        amount: f64,
        /// Transaction category ("Catering", "VFX", ...)
        #[arg(short, long, default_value = "Other")]
        category: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Line item name to charge against
        #[arg(short, long)]
        item: Option<String>,
        #[arg(long)]
        payee: Option<String>,
        #[arg(long)]
        income: bool,
    },
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Budgeted")]
    budgeted: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn find_item_id(manager: &VersionManager, name: &str) -> LedgerResult<crate::models::LineItemId> {
    manager
        .selected()
        .and_then(|v| {
            v.line_items
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(name.trim()))
        })
        .map(|i| i.id)
        .ok_or_else(|| LedgerError::NotFound {
            entity_type: "Line item",
            identifier: name.to_string(),
        })
}

fn parse_date(date: Option<&str>) -> LedgerResult<NaiveDate> {
    match date {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            LedgerError::InvalidInput(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", date, e))
        }),
        None => Ok(Local::now().date_naive()),
    }
}

/// Handle a line item command
pub fn handle_item_command(
    manager: &mut VersionManager,
    storage: &Storage,
    audit: &AuditLogger,
    cmd: ItemCommands,
) -> LedgerResult<()> {
    match cmd {
        ItemCommands::Add {
            name,
            category,
            account,
            quantity,
            days,
            unit_cost,
            parent,
            rate_card,
        } => {
            let mut item = BudgetLineItem::with_amounts(name.trim(), category.trim(), quantity, days, unit_cost);
            item.account = account.trim().to_string();

            if let Some(parent) = parent {
                item = item.as_child_of(find_item_id(manager, &parent)?);
            }

            if let Some(card) = rate_card {
                let cards = RateCardManager::new(storage, audit);
                let card = cards
                    .find(&card)?
                    .ok_or_else(|| LedgerError::rate_card_not_found(&card))?;
                link_item_to_rate_card(&mut item, &card);
            }

            let total = item.line_total();
            manager.add_line_item(item)?;
            println!("Added line item: {}", name.trim());
            println!("  Total: {:.2}", total);
        }

        ItemCommands::List => {
            let rows: Vec<_> = manager
                .item_variances()?
                .into_iter()
                .map(|(item, variance)| ItemRow {
                    account: item.account,
                    name: if item.parent_item_id.is_some() {
                        format!("  {}", item.name)
                    } else {
                        item.name
                    },
                    category: item.category,
                    budgeted: format!("{:.2}", variance.budgeted),
                    actual: format!("{:.2}", variance.actual),
                    status: variance.status.to_string(),
                })
                .collect();

            if rows.is_empty() {
                println!("No line items in this version.");
            } else {
                println!("{}", Table::new(rows).with(Style::psql()));
            }
        }
    }

    Ok(())
}

/// Handle a transaction command
pub fn handle_transaction_command(manager: &mut VersionManager, cmd: TransactionCommands) -> LedgerResult<()> {
    match cmd {
        TransactionCommands::Add {
            amount,
            category,
            date,
            item,
            payee,
            income,
        } => {
            let date = parse_date(date.as_deref())?;
            let mut tx = if income {
                BudgetTransaction::income(date, amount, category.trim())
            } else {
                BudgetTransaction::expense(date, amount, category.trim())
            };
            if let Some(payee) = payee {
                tx.payee = payee;
            }
            if let Some(item) = item {
                tx = tx.linked_to(find_item_id(manager, &item)?);
            }

            let kind = tx.transaction_type;
            manager.add_transaction(tx)?;
            println!("Recorded {}: {:.2} ({})", kind, amount, category.trim());
        }
    }

    Ok(())
}
