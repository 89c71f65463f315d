//! Rate card display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::RateCard;

#[derive(Tabled)]
struct RateCardRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

/// Format rate cards as a table
pub fn format_rate_card_list(cards: &[RateCard]) -> String {
    if cards.is_empty() {
        return "No rate cards found.\n".to_string();
    }

    let rows = cards.iter().map(|card| RateCardRow {
        id: card.id.to_string(),
        name: card.name.clone(),
        category: card.category.clone(),
        rate: format!("{:.2}", card.default_rate),
        unit: card.default_unit.clone(),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}
