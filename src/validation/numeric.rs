//! Numeric helpers shared by validation and calculation

/// Constrain `value` to `[min, max]`
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Round to two decimal places
pub fn round_to_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Coerce NaN and infinities to 0, and negatives to 0 unless allowed
pub fn sanitize_numeric(value: f64, allow_negative: bool) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if value < 0.0 && !allow_negative {
        return 0.0;
    }
    value
}
