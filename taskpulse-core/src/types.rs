//! Core domain types for taskpulse
//!
//! These types mirror the rows held by the task store. The analytics layer
//! only ever reads [`Task`]s; it writes [`AnalyticsSnapshot`] and
//! [`NotificationSettings`] back through the store.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Task** | One thing a user plans to do on a given calendar date |
//! | **Window** | The inclusive date range `[today - days_back, today]` an aggregation runs over |
//! | **Snapshot** | The single analytics row kept per user, overwritten by every run |
//! | **Completion hour** | Hour of day (0-23) taken from a task's completion timestamp |

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Identifier of the user owning tasks, settings and snapshots.
pub type UserId = i64;

// ============================================
// Task
// ============================================

/// Lifecycle state of a task.
///
/// Tasks start as [`TaskStatus::Pending`]; `Completed` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are allowed from this state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("unknown task status: {}", s)),
        }
    }
}

/// A task record as held by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identifier
    pub id: String,
    /// Owning user
    pub user_id: UserId,
    /// Free-form description
    pub description: String,
    /// Calendar date the task targets
    pub task_date: NaiveDate,
    /// Current lifecycle state
    pub status: TaskStatus,
    /// Local wall-clock completion time, set iff completed
    pub completed_at: Option<NaiveDateTime>,
    /// Why the task was dropped, set iff cancelled
    pub cancellation_reason: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == TaskStatus::Cancelled
    }
}

/// Fields needed to insert a new pending task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: UserId,
    pub description: String,
    pub task_date: NaiveDate,
}

// ============================================
// Derived records
// ============================================

/// Sentinel stored as the cancellation reason when nothing was cancelled.
pub const NO_CANCELLATIONS: &str = "none";

/// Per-user analytics row, overwritten on every analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub user_id: UserId,
    /// Hour (0-23) with the most completions
    pub best_completion_hour: u32,
    /// Hour (0-23) with the fewest completions
    pub worst_completion_hour: u32,
    /// Day of week (0=Monday, ..., 6=Sunday) with the highest completion rate
    pub best_day_of_week: u32,
    /// Day of week (0=Monday, ..., 6=Sunday) with the lowest completion rate
    pub worst_day_of_week: u32,
    /// Percentage of tasks completed in the pattern window, 0-100
    pub avg_completion_rate: f64,
    /// Most frequent cancellation reason, or [`NO_CANCELLATIONS`]
    pub most_common_cancellation_reason: String,
    pub optimal_reminder_time: NaiveTime,
    /// Composite score; capped at 100, not floored
    pub productivity_score: f64,
    pub analysis_date: NaiveDate,
}

/// Notification times for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub user_id: UserId,
    pub morning_notification_time: NaiveTime,
    pub reminder_notification_time: NaiveTime,
    pub last_adjusted_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&TaskStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
