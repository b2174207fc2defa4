//! Day-of-week analysis.
//!
//! Days are indexed Monday = 0 through Sunday = 6. Stored snapshots and the
//! suggestion prompt depend on this numbering, so it is spelled out in
//! [`weekday_index`] instead of borrowed from a library default.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::Task;

/// Best day reported for an empty window (Tuesday).
pub const DEFAULT_BEST_DAY: u32 = 1;
/// Worst day reported for an empty window (Saturday).
pub const DEFAULT_WORST_DAY: u32 = 5;

/// Map a weekday onto the Monday = 0 index used throughout taskpulse.
pub fn weekday_index(weekday: Weekday) -> u32 {
    match weekday {
        Weekday::Mon => 0,
        Weekday::Tue => 1,
        Weekday::Wed => 2,
        Weekday::Thu => 3,
        Weekday::Fri => 4,
        Weekday::Sat => 5,
        Weekday::Sun => 6,
    }
}

/// Which days of the week a user tends to get through their list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAnalysis {
    pub best_day: u32,
    pub worst_day: u32,
    /// Completed / total per day index; days without tasks are absent.
    pub daily_completion_rates: BTreeMap<u32, f64>,
}

impl Default for DayAnalysis {
    fn default() -> Self {
        Self {
            best_day: DEFAULT_BEST_DAY,
            worst_day: DEFAULT_WORST_DAY,
            daily_completion_rates: BTreeMap::new(),
        }
    }
}

/// Completion rate per day of week, grouped on `task_date`.
///
/// Ties go to the lowest day index. Falls back to 1 / 5 for an empty list.
pub fn best_days(tasks: &[Task]) -> DayAnalysis {
    // day -> (completed, total)
    let mut counts: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for task in tasks {
        let entry = counts
            .entry(weekday_index(task.task_date.weekday()))
            .or_insert((0, 0));
        if task.is_completed() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let daily_completion_rates: BTreeMap<u32, f64> = counts
        .into_iter()
        .map(|(day, (completed, total))| (day, completed as f64 / total as f64))
        .collect();

    let (Some(best_day), Some(worst_day)) = (
        super::first_max_key(&daily_completion_rates),
        super::first_min_key(&daily_completion_rates),
    ) else {
        return DayAnalysis::default();
    };

    DayAnalysis {
        best_day,
        worst_day,
        daily_completion_rates,
    }
}
