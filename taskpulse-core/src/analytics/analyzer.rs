//! Analysis orchestration.
//!
//! [`ProductivityAnalyzer`] pulls a user's task windows from the injected
//! [`TaskStore`], runs the aggregations, assembles an [`AnalyticsSnapshot`]
//! and writes it back together with the derived reminder time.
//!
//! Behavioral patterns (hours, days, cancellations, average completion) look
//! back `pattern_window_days` (30 by default). The productivity score only
//! sees the last `score_window_days` (7 by default).

use chrono::{Days, Local, NaiveDate, NaiveTime};

use super::{
    best_completion_hours, best_days, cancellation_patterns, completion_rate_percent,
    optimal_reminder_time, productivity_score, CancellationAnalysis, DayAnalysis, HourAnalysis,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::store::TaskStore;
use crate::types::{AnalyticsSnapshot, Task, UserId};

/// Runs the productivity analysis for one user at a time.
pub struct ProductivityAnalyzer<S> {
    store: S,
    config: AnalysisConfig,
}

impl<S: TaskStore> ProductivityAnalyzer<S> {
    /// Create an analyzer with the default 30 / 7 day windows.
    pub fn new(store: S) -> Self {
        Self::with_config(store, AnalysisConfig::default())
    }

    pub fn with_config(store: S, config: AnalysisConfig) -> Self {
        Self { store, config }
    }

    /// The store this analyzer reads from and writes to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tasks in the inclusive window `[today - days_back, today]`.
    pub fn fetch_window(
        &self,
        user_id: UserId,
        today: NaiveDate,
        days_back: u32,
    ) -> Result<Vec<Task>> {
        let start = today
            .checked_sub_days(Days::new(u64::from(days_back)))
            .unwrap_or(NaiveDate::MIN);
        self.store.fetch_tasks(user_id, Some(start), Some(today))
    }

    pub fn analyze_best_completion_hours(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<HourAnalysis> {
        let tasks = self.fetch_window(user_id, today, self.config.pattern_window_days)?;
        Ok(best_completion_hours(&tasks))
    }

    pub fn analyze_best_days(&self, user_id: UserId, today: NaiveDate) -> Result<DayAnalysis> {
        let tasks = self.fetch_window(user_id, today, self.config.pattern_window_days)?;
        Ok(best_days(&tasks))
    }

    pub fn calculate_productivity_score(&self, user_id: UserId, today: NaiveDate) -> Result<f64> {
        let days_back = self.config.score_window_days;
        let tasks = self.fetch_window(user_id, today, days_back)?;
        Ok(productivity_score(&tasks, days_back))
    }

    /// Reminder time derived from the pattern-window hour analysis.
    pub fn calculate_optimal_reminder_time(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<NaiveTime> {
        let hours = self.analyze_best_completion_hours(user_id, today)?;
        Ok(optimal_reminder_time(&hours))
    }

    pub fn analyze_cancellation_patterns(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<CancellationAnalysis> {
        let tasks = self.fetch_window(user_id, today, self.config.pattern_window_days)?;
        Ok(cancellation_patterns(&tasks))
    }

    /// Run the full analysis as of today's local date.
    pub fn run_full_analysis(&self, user_id: UserId) -> Result<AnalyticsSnapshot> {
        self.run_full_analysis_on(user_id, Local::now().date_naive())
    }

    /// Run every aggregation, persist the snapshot and adjust notification times.
    ///
    /// Writes the snapshot first and the notification settings second. A
    /// failure in either write is returned as-is; a snapshot that was already
    /// written stays written.
    pub fn run_full_analysis_on(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<AnalyticsSnapshot> {
        tracing::info!(user_id, %today, "Running productivity analysis");

        let pattern_days = self.config.pattern_window_days;
        let score_days = self.config.score_window_days;

        let pattern_tasks = self.fetch_window(user_id, today, pattern_days)?;
        let score_tasks = if score_days == pattern_days {
            pattern_tasks.clone()
        } else {
            self.fetch_window(user_id, today, score_days)?
        };

        let hours = best_completion_hours(&pattern_tasks);
        let days = best_days(&pattern_tasks);
        let score = productivity_score(&score_tasks, score_days);
        let reminder = optimal_reminder_time(&hours);
        let cancellations = cancellation_patterns(&pattern_tasks);
        let avg_completion_rate = completion_rate_percent(&pattern_tasks);

        tracing::debug!(
            user_id,
            pattern_tasks = pattern_tasks.len(),
            score_tasks = score_tasks.len(),
            best_hour = hours.best_hour,
            worst_hour = hours.worst_hour,
            best_day = days.best_day,
            worst_day = days.worst_day,
            cancellations = ?cancellations.total_cancellations,
            "Aggregations computed"
        );

        let snapshot = AnalyticsSnapshot {
            user_id,
            best_completion_hour: hours.best_hour,
            worst_completion_hour: hours.worst_hour,
            best_day_of_week: days.best_day,
            worst_day_of_week: days.worst_day,
            avg_completion_rate,
            most_common_cancellation_reason: cancellations.most_common_reason,
            optimal_reminder_time: reminder,
            productivity_score: score,
            analysis_date: today,
        };

        let stored = self.store.upsert_analytics_snapshot(&snapshot)?;
        self.store.upsert_notification_settings(
            user_id,
            self.config.morning_notification_time,
            reminder,
        )?;

        tracing::info!(
            user_id,
            score = stored.productivity_score,
            reminder = %stored.optimal_reminder_time,
            "Productivity analysis stored"
        );

        Ok(stored)
    }

    /// The most recently stored snapshot for a user.
    pub fn latest_snapshot(&self, user_id: UserId) -> Result<Option<AnalyticsSnapshot>> {
        self.store.latest_analytics_snapshot(user_id)
    }
}
