//! Task store abstraction
//!
//! The analytics layer never talks to a concrete backend. It is handed a
//! [`TaskStore`] at construction time, so the SQLite [`Database`](crate::Database)
//! used by the CLI and the [`MemoryStore`] used in tests are interchangeable.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{AnalyticsSnapshot, NewTask, NotificationSettings, Task, TaskStatus, UserId};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Storage operations the analyzer and the CLI rely on.
///
/// Implementations must return the whole matching set from
/// [`fetch_tasks`](TaskStore::fetch_tasks) in one call; the analyzer does
/// not paginate.
pub trait TaskStore: Send + Sync {
    /// Tasks for `user_id` whose `task_date` lies within the inclusive bounds.
    ///
    /// Either bound may be omitted. Results are ordered by `task_date`
    /// descending, but callers must not depend on the order.
    fn fetch_tasks(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Task>>;

    /// Insert or overwrite the analytics snapshot for `snapshot.user_id`.
    fn upsert_analytics_snapshot(&self, snapshot: &AnalyticsSnapshot)
        -> Result<AnalyticsSnapshot>;

    /// Insert or overwrite the notification times for a user.
    fn upsert_notification_settings(
        &self,
        user_id: UserId,
        morning: NaiveTime,
        reminder: NaiveTime,
    ) -> Result<NotificationSettings>;

    /// The stored snapshot for a user, if any run has completed.
    fn latest_analytics_snapshot(&self, user_id: UserId) -> Result<Option<AnalyticsSnapshot>>;

    /// Insert a new pending task.
    fn add_task(&self, task: &NewTask) -> Result<Task>;

    /// Mark a pending task completed at the given local time.
    fn complete_task(&self, task_id: &str, completed_at: NaiveDateTime) -> Result<Task>;

    /// Mark a pending task cancelled with a reason.
    fn cancel_task(&self, task_id: &str, reason: &str) -> Result<Task>;

    /// Stored notification times for a user.
    fn notification_settings(&self, user_id: UserId) -> Result<Option<NotificationSettings>>;

    /// Pending tasks targeting a single date.
    fn pending_tasks(&self, user_id: UserId, date: NaiveDate) -> Result<Vec<Task>> {
        Ok(self
            .fetch_tasks(user_id, Some(date), Some(date))?
            .into_iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .collect())
    }
}
