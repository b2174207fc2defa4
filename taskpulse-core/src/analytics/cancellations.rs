//! Cancellation pattern analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Task, NO_CANCELLATIONS};

/// Reason reported when tasks were cancelled but none recorded why.
pub const UNKNOWN_REASON: &str = "N/A";

/// Why a user drops tasks, and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationAnalysis {
    pub most_common_reason: String,
    /// `None` when nothing was cancelled
    pub total_cancellations: Option<usize>,
    /// Cancelled / all tasks in the window; `None` when nothing was cancelled
    pub cancellation_rate: Option<f64>,
}

impl Default for CancellationAnalysis {
    fn default() -> Self {
        Self {
            most_common_reason: NO_CANCELLATIONS.to_string(),
            total_cancellations: None,
            cancellation_rate: None,
        }
    }
}

/// Most frequent cancellation reason over the window.
///
/// Equal counts resolve to the lexicographically smallest reason.
pub fn cancellation_patterns(tasks: &[Task]) -> CancellationAnalysis {
    let cancelled: Vec<&Task> = tasks.iter().filter(|t| t.is_cancelled()).collect();
    if cancelled.is_empty() {
        return CancellationAnalysis::default();
    }

    let mut reason_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for reason in cancelled
        .iter()
        .filter_map(|t| t.cancellation_reason.as_deref())
    {
        *reason_counts.entry(reason).or_insert(0) += 1;
    }

    let most_common_reason = super::first_max_key(&reason_counts)
        .unwrap_or(UNKNOWN_REASON)
        .to_string();

    CancellationAnalysis {
        most_common_reason,
        total_cancellations: Some(cancelled.len()),
        cancellation_rate: Some(cancelled.len() as f64 / tasks.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{cancelled, completed_at, pending};

    #[test]
    fn test_no_cancellations_uses_sentinel() {
        assert_eq!(cancellation_patterns(&[]), CancellationAnalysis::default());

        let analysis = cancellation_patterns(&[completed_at(1, 9), pending(2)]);
        assert_eq!(analysis.most_common_reason, "none");
        assert!(analysis.total_cancellations.is_none());
        assert!(analysis.cancellation_rate.is_none());
    }

    #[test]
    fn test_most_common_reason() {
        let tasks = vec![
            cancelled(1, Some("too busy")),
            cancelled(2, Some("too busy")),
            cancelled(3, Some("forgot")),
            completed_at(4, 9),
        ];

        let analysis = cancellation_patterns(&tasks);
        assert_eq!(analysis.most_common_reason, "too busy");
        assert_eq!(analysis.total_cancellations, Some(3));
        // Rate is over the whole window, not just the cancelled subset
        assert_eq!(analysis.cancellation_rate, Some(0.75));
    }

    #[test]
    fn test_tied_reasons_pick_smallest() {
        let tasks = vec![
            cancelled(1, Some("sick")),
            cancelled(2, Some("meeting")),
            cancelled(3, Some("sick")),
            cancelled(4, Some("meeting")),
        ];
        assert_eq!(cancellation_patterns(&tasks).most_common_reason, "meeting");
    }

    #[test]
    fn test_missing_reasons() {
        let tasks = vec![cancelled(1, None), cancelled(2, None), pending(3)];
        let analysis = cancellation_patterns(&tasks);
        assert_eq!(analysis.most_common_reason, UNKNOWN_REASON);
        assert_eq!(analysis.total_cancellations, Some(2));

        // Recorded reasons win over unrecorded ones regardless of count
        let tasks = vec![cancelled(1, None), cancelled(2, None), cancelled(3, Some("rain"))];
        assert_eq!(cancellation_patterns(&tasks).most_common_reason, "rain");
    }
}
