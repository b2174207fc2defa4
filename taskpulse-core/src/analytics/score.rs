//! Composite productivity score.
//!
//! ```text
//! score = min(completion_rate * 60 - cancellation_rate * 20 + consistency_bonus, 100)
//! consistency_bonus = min(distinct_days / days_back, 1) * 20
//! ```
//!
//! The score is capped at 100 but has no lower bound: a window dominated by
//! cancellations can score below zero.

use std::collections::HashSet;

use crate::types::Task;

/// Score reported for an empty window.
pub const NEUTRAL_SCORE: f64 = 50.0;
/// Upper bound of the score.
pub const MAX_SCORE: f64 = 100.0;

const COMPLETION_WEIGHT: f64 = 60.0;
const CANCELLATION_PENALTY: f64 = 20.0;
const CONSISTENCY_WEIGHT: f64 = 20.0;

/// Score a user's recent tasks; rounded to two decimals.
pub fn productivity_score(tasks: &[Task], days_back: u32) -> f64 {
    if tasks.is_empty() {
        return NEUTRAL_SCORE;
    }

    let total = tasks.len() as f64;
    let completion_rate = tasks.iter().filter(|t| t.is_completed()).count() as f64 / total;
    let cancellation_rate = tasks.iter().filter(|t| t.is_cancelled()).count() as f64 / total;

    let unique_days = tasks.iter().map(|t| t.task_date).collect::<HashSet<_>>().len();
    let coverage = if days_back == 0 {
        1.0
    } else {
        (unique_days as f64 / days_back as f64).min(1.0)
    };
    let consistency_bonus = coverage * CONSISTENCY_WEIGHT;

    let score = (completion_rate * COMPLETION_WEIGHT - cancellation_rate * CANCELLATION_PENALTY
        + consistency_bonus)
        .min(MAX_SCORE);

    round2(score)
}

/// Share of completed tasks as a percentage, rounded to two decimals.
///
/// Returns 0.0 for an empty window.
pub fn completion_rate_percent(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.is_completed()).count() as f64;
    round2(completed / tasks.len() as f64 * 100.0)
}

/// Round to two decimals, sending exact ties to the even neighbour
/// (3.125 -> 3.12, 3.375 -> 3.38).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
