//! Completion-hour analysis.

use std::collections::BTreeMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::types::Task;

/// Best hour reported when there is nothing to learn from.
pub const DEFAULT_BEST_HOUR: u32 = 8;
/// Worst hour reported when there is nothing to learn from.
pub const DEFAULT_WORST_HOUR: u32 = 18;

/// When in the day a user tends to finish tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourAnalysis {
    pub best_hour: u32,
    pub worst_hour: u32,
    /// Completions per hour; only hours with at least one completion appear.
    pub hourly_distribution: BTreeMap<u32, usize>,
}

impl Default for HourAnalysis {
    fn default() -> Self {
        Self {
            best_hour: DEFAULT_BEST_HOUR,
            worst_hour: DEFAULT_WORST_HOUR,
            hourly_distribution: BTreeMap::new(),
        }
    }
}

/// Bucket completed tasks by the hour of `completed_at`.
///
/// `best_hour` has the most completions and `worst_hour` the fewest; ties go
/// to the earliest hour. Falls back to 8 / 18 when nothing was completed.
pub fn best_completion_hours(tasks: &[Task]) -> HourAnalysis {
    let mut hourly_distribution: BTreeMap<u32, usize> = BTreeMap::new();
    for completed_at in tasks
        .iter()
        .filter(|t| t.is_completed())
        .filter_map(|t| t.completed_at)
    {
        *hourly_distribution.entry(completed_at.hour()).or_insert(0) += 1;
    }

    let (Some(best_hour), Some(worst_hour)) = (
        super::first_max_key(&hourly_distribution),
        super::first_min_key(&hourly_distribution),
    ) else {
        return HourAnalysis::default();
    };

    HourAnalysis {
        best_hour,
        worst_hour,
        hourly_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{cancelled, completed_at, pending};

    #[test]
    fn test_empty_input_falls_back() {
        let analysis = best_completion_hours(&[]);
        assert_eq!(analysis.best_hour, 8);
        assert_eq!(analysis.worst_hour, 18);
        assert!(analysis.hourly_distribution.is_empty());
    }

    #[test]
    fn test_no_completed_tasks_falls_back() {
        let tasks = vec![pending(1), cancelled(2, Some("busy"))];
        assert_eq!(best_completion_hours(&tasks), HourAnalysis::default());
    }

    #[test]
    fn test_single_outlier_hour_is_worst() {
        let mut tasks: Vec<Task> = (0..5).map(|i| completed_at(1 + i, 9)).collect();
        tasks.push(completed_at(3, 14));
        tasks.push(pending(4));

        let analysis = best_completion_hours(&tasks);
        assert_eq!(analysis.best_hour, 9);
        assert_eq!(analysis.worst_hour, 14);
        assert_eq!(
            analysis.hourly_distribution,
            BTreeMap::from([(9, 5), (14, 1)])
        );
    }

    #[test]
    fn test_ties_resolve_to_earliest_hour() {
        let tasks = vec![
            completed_at(1, 21),
            completed_at(2, 7),
            completed_at(3, 13),
            completed_at(4, 13),
            completed_at(5, 7),
        ];

        let analysis = best_completion_hours(&tasks);
        // 7 and 13 tie on two completions each
        assert_eq!(analysis.best_hour, 7);
        assert_eq!(analysis.worst_hour, 21);

        let single = best_completion_hours(&[completed_at(1, 16)]);
        assert_eq!(single.best_hour, 16);
        assert_eq!(single.worst_hour, 16);
    }

    #[test]
    fn test_completed_without_timestamp_is_ignored() {
        let mut task = completed_at(2, 10);
        task.completed_at = None;
        assert_eq!(best_completion_hours(&[task]), HourAnalysis::default());
    }
}
