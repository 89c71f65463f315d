//! Rate card CLI commands

use clap::Subcommand;

use crate::audit::AuditLogger;
use crate::display::format_rate_card_list;
use crate::error::{LedgerError, LedgerResult};
use crate::models::RateCard;
use crate::services::{RateCardManager, VersionManager};
use crate::storage::Storage;

/// Rate card subcommands
#[derive(Subcommand)]
pub enum RateCardCommands {
    /// List rate cards
    List {
        /// Only cards in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a rate card
    Add {
        /// Card name
        name: String,
        /// Default rate per unit
        rate: f64,
        #[arg(short, long, default_value = "General")]
        category: String,
        /// Unit the rate applies to (day, week, flat, ...)
        #[arg(short, long, default_value = "day")]
        unit: String,
    },
    /// Change a card's default rate
    SetRate {
        /// Card name or ID
        card: String,
        rate: f64,
    },
    /// Delete a rate card
    Delete {
        /// Card name or ID
        card: String,
    },
    /// Push a card's rate into linked items of the selected version
    Apply {
        /// Card name or ID
        card: String,
    },
}

fn find_card(cards: &RateCardManager, identifier: &str) -> LedgerResult<RateCard> {
    cards
        .find(identifier)?
        .ok_or_else(|| LedgerError::rate_card_not_found(identifier))
}

/// Handle a rate card command
pub fn handle_rate_card_command(
    manager: &mut VersionManager,
    storage: &Storage,
    audit: &AuditLogger,
    cmd: RateCardCommands,
) -> LedgerResult<()> {
    let cards = RateCardManager::new(storage, audit);

    match cmd {
        RateCardCommands::List { category } => {
            let list = match category {
                Some(category) => cards.list_by_category(&category)?,
                None => cards.list()?,
            };
            print!("{}", format_rate_card_list(&list));
        }

        RateCardCommands::Add {
            name,
            rate,
            category,
            unit,
        } => {
            let card = cards.create(&name, &category, &unit, rate)?;
            println!("Created rate card: {}", card.name);
            println!("  ID: {}", card.id);
            println!("  Rate: {:.2} / {}", card.default_rate, card.default_unit);
        }

        RateCardCommands::SetRate { card, rate } => {
            let mut existing = find_card(&cards, &card)?;
            let old_rate = existing.default_rate;
            existing.default_rate = rate;
            let updated = cards.update(existing)?;
            println!(
                "{}: {:.2} -> {:.2}",
                updated.name, old_rate, updated.default_rate
            );
            println!("Run 'rate-card apply' to update linked line items.");
        }

        RateCardCommands::Delete { card } => {
            let existing = find_card(&cards, &card)?;
            let deleted = cards.delete(existing.id)?;
            println!("Deleted rate card: {}", deleted.name);
        }

        RateCardCommands::Apply { card } => {
            let card = find_card(&cards, &card)?;
            let changed = manager.apply_rate_card(card.id)?;
            if changed == 0 {
                println!("No linked line items needed updating.");
            } else {
                println!("Updated {} line item(s) from {}", changed, card.name);
            }
        }
    }

    Ok(())
}
