//! Analytics module for taskpulse
//!
//! Derives behavioral insights from a user's task history:
//! - Best/worst completion hour ([`hours`])
//! - Best/worst day of week ([`days`])
//! - Dominant cancellation reason ([`cancellations`])
//! - Composite productivity score ([`score`])
//! - Reminder time ([`reminder`])
//!
//! The aggregations are pure functions over a task slice and always return a
//! well-formed result; an empty window yields fixed fallbacks rather than an
//! error. [`ProductivityAnalyzer`] sequences them against a
//! [`TaskStore`](crate::store::TaskStore) and persists the resulting snapshot.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskpulse_core::analytics::ProductivityAnalyzer;
//! use taskpulse_core::{Config, Database};
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let analyzer = ProductivityAnalyzer::new(db);
//! let snapshot = analyzer.run_full_analysis(1).expect("analysis failed");
//! println!("score: {}", snapshot.productivity_score);
//! ```

pub mod analyzer;
pub mod cancellations;
pub mod days;
pub mod hours;
pub mod reminder;
pub mod score;

use std::collections::BTreeMap;

pub use analyzer::ProductivityAnalyzer;
pub use cancellations::{cancellation_patterns, CancellationAnalysis};
pub use days::{best_days, weekday_index, DayAnalysis};
pub use hours::{best_completion_hours, HourAnalysis};
pub use reminder::optimal_reminder_time;
pub use score::{completion_rate_percent, productivity_score};

/// Smallest key holding the largest value.
///
/// Only a strictly greater value replaces the current pick, so ascending
/// iteration makes the lowest key win ties.
fn first_max_key<K: Copy + Ord, V: PartialOrd>(map: &BTreeMap<K, V>) -> Option<K> {
    let mut best: Option<(K, &V)> = None;
    for (key, value) in map {
        let replace = match best {
            Some((_, current)) => value > current,
            None => true,
        };
        if replace {
            best = Some((*key, value));
        }
    }
    best.map(|(key, _)| key)
}

/// Smallest key holding the smallest value.
fn first_min_key<K: Copy + Ord, V: PartialOrd>(map: &BTreeMap<K, V>) -> Option<K> {
    let mut worst: Option<(K, &V)> = None;
    for (key, value) in map {
        let replace = match worst {
            Some((_, current)) => value < current,
            None => true,
        };
        if replace {
            worst = Some((*key, value));
        }
    }
    worst.map(|(key, _)| key)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Task builders for analytics tests. Dates are days of October 2026.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, NaiveTime};

    use crate::types::{Task, TaskStatus};

    static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

    pub fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    pub fn at_hour(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn task(day: u32, status: TaskStatus) -> Task {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Task {
            id: format!("task-{}", id),
            user_id: 1,
            description: format!("task {}", id),
            task_date: date(day),
            status,
            completed_at: None,
            cancellation_reason: None,
        }
    }

    pub fn pending(day: u32) -> Task {
        task(day, TaskStatus::Pending)
    }

    pub fn completed_at(day: u32, hour: u32) -> Task {
        Task {
            completed_at: Some(date(day).and_hms_opt(hour, 15, 0).unwrap()),
            ..task(day, TaskStatus::Completed)
        }
    }

    pub fn cancelled(day: u32, reason: Option<&str>) -> Task {
        Task {
            cancellation_reason: reason.map(str::to_string),
            ..task(day, TaskStatus::Cancelled)
        }
    }
}
