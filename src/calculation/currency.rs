//! Currency conversion over caller-supplied rates

use std::collections::HashMap;

/// Convert `amount` between currencies using rates relative to a common base
///
/// Returns `amount` unchanged when either code is missing from `rates` or
/// the source rate is not positive.
pub fn convert_currency(amount: f64, from: &str, to: &str, rates: &HashMap<String, f64>) -> f64 {
    let (Some(&from_rate), Some(&to_rate)) = (rates.get(from), rates.get(to)) else {
        return amount;
    };

    if from_rate <= 0.0 {
        return amount;
    }

    amount / from_rate * to_rate
}
