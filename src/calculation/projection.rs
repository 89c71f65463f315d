//! Linear spend projection

use serde::Serialize;

/// Projected end-of-schedule spend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    pub daily_rate: f64,
    pub projected_total: f64,
    pub projected_remaining: f64,
    pub days_remaining: i64,
    pub on_track: bool,
}

/// Extrapolate the current daily burn over the remaining days
///
/// Before any day has elapsed (or with no schedule) the projection is just
/// the spend so far and is reported on track.
pub fn project_remaining(
    total_budget: f64,
    spent: f64,
    days_elapsed: i64,
    total_days: i64,
) -> Projection {
    if days_elapsed <= 0 || total_days <= 0 {
        return Projection {
            daily_rate: 0.0,
            projected_total: spent,
            projected_remaining: total_budget - spent,
            days_remaining: total_days,
            on_track: true,
        };
    }

    let daily_rate = spent / days_elapsed as f64;
    let days_remaining = total_days - days_elapsed;
    let projected_total = spent + daily_rate * days_remaining as f64;

    Projection {
        daily_rate,
        projected_total,
        projected_remaining: total_budget - projected_total,
        days_remaining,
        on_track: projected_total <= total_budget,
    }
}
