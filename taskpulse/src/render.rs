//! Plain-text rendering for CLI output.

use std::fmt::Write;

use taskpulse_core::format::{day_name, format_clock, format_hour, format_percent};
use taskpulse_core::{AnalyticsSnapshot, Task, TaskStatus};

/// One line per task: id, date, status and any completion or cancellation detail.
pub fn task_line(task: &Task) -> String {
    let detail = match task.status {
        TaskStatus::Pending => String::new(),
        TaskStatus::Completed => task
            .completed_at
            .map(|at| format!(" (at {})", at.format("%Y-%m-%d %H:%M")))
            .unwrap_or_default(),
        TaskStatus::Cancelled => task
            .cancellation_reason
            .as_deref()
            .map(|reason| format!(" ({reason})"))
            .unwrap_or_default(),
    };

    format!(
        "{}  {}  {:<9}  {}{}",
        task.id,
        task.task_date,
        task.status.as_str(),
        task.description,
        detail
    )
}

pub fn snapshot_text(snapshot: &AnalyticsSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Productivity analysis for user {} ({})",
        snapshot.user_id, snapshot.analysis_date
    );

    let rows = [
        ("Best completion hour", format_hour(snapshot.best_completion_hour)),
        ("Worst completion hour", format_hour(snapshot.worst_completion_hour)),
        ("Best day", day_name(snapshot.best_day_of_week).to_string()),
        ("Worst day", day_name(snapshot.worst_day_of_week).to_string()),
        ("Completion rate", format_percent(snapshot.avg_completion_rate)),
        (
            "Top cancellation reason",
            snapshot.most_common_cancellation_reason.clone(),
        ),
        ("Reminder time", format_clock(snapshot.optimal_reminder_time)),
        (
            "Productivity score",
            format!("{:.2} / 100", snapshot.productivity_score),
        ),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<24} {}", format!("{label}:"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_snapshot_text() {
        let snapshot = AnalyticsSnapshot {
            user_id: 1,
            best_completion_hour: 9,
            worst_completion_hour: 10,
            best_day_of_week: 1,
            worst_day_of_week: 3,
            avg_completion_rate: 80.0,
            most_common_cancellation_reason: "too busy".to_string(),
            optimal_reminder_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            productivity_score: 60.29,
            analysis_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        };
        let text = snapshot_text(&snapshot);
        assert!(text.starts_with("Productivity analysis for user 1 (2026-10-19)"));
        assert!(text.contains("Best completion hour:    09:00"));
        assert!(text.contains("Best day:                Tuesday"));
        assert!(text.contains("Reminder time:           14:00"));
        assert!(text.contains("60.29 / 100"));
    }

    #[test]
    fn test_task_line() {
        let task = Task {
            id: "abc".to_string(),
            user_id: 1,
            description: "Call plumber".to_string(),
            task_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            status: TaskStatus::Cancelled,
            completed_at: None,
            cancellation_reason: Some("too busy".to_string()),
        };
        assert_eq!(
            task_line(&task),
            "abc  2026-10-15  cancelled  Call plumber (too busy)"
        );
    }
}
