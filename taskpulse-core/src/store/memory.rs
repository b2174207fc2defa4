//! In-memory task store.
//!
//! Backs unit tests and anything else that needs a [`TaskStore`] without a
//! database file. Behaves like the SQLite store: inclusive date bounds,
//! upserts keyed by user, pending-only status transitions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use super::TaskStore;
use crate::error::{Error, Result};
use crate::types::{AnalyticsSnapshot, NewTask, NotificationSettings, Task, TaskStatus, UserId};

#[derive(Default)]
struct MemoryState {
    tasks: Vec<Task>,
    snapshots: HashMap<UserId, AnalyticsSnapshot>,
    settings: HashMap<UserId, NotificationSettings>,
}

/// Task store that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with fully-formed task records.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.tasks.extend(tasks);
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Store("in-memory store lock poisoned".to_string()))
    }

    fn transition(
        &self,
        task_id: &str,
        apply: impl FnOnce(&mut Task),
    ) -> Result<Task> {
        let mut state = self.lock()?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        if task.status.is_terminal() {
            return Err(Error::InvalidTransition {
                id: task.id.clone(),
                status: task.status,
            });
        }

        apply(task);
        Ok(task.clone())
    }
}

impl TaskStore for MemoryStore {
    fn fetch_tasks(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Task>> {
        let state = self.lock()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| start.map_or(true, |s| t.task_date >= s))
            .filter(|t| end.map_or(true, |e| t.task_date <= e))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.task_date.cmp(&a.task_date));
        Ok(tasks)
    }

    fn upsert_analytics_snapshot(
        &self,
        snapshot: &AnalyticsSnapshot,
    ) -> Result<AnalyticsSnapshot> {
        self.lock()?
            .snapshots
            .insert(snapshot.user_id, snapshot.clone());
        Ok(snapshot.clone())
    }

    fn upsert_notification_settings(
        &self,
        user_id: UserId,
        morning: NaiveTime,
        reminder: NaiveTime,
    ) -> Result<NotificationSettings> {
        let settings = NotificationSettings {
            user_id,
            morning_notification_time: morning,
            reminder_notification_time: reminder,
            last_adjusted_at: Local::now().naive_local(),
        };
        self.lock()?.settings.insert(user_id, settings.clone());
        Ok(settings)
    }

    fn latest_analytics_snapshot(&self, user_id: UserId) -> Result<Option<AnalyticsSnapshot>> {
        Ok(self.lock()?.snapshots.get(&user_id).cloned())
    }

    fn add_task(&self, task: &NewTask) -> Result<Task> {
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: task.user_id,
            description: task.description.clone(),
            task_date: task.task_date,
            status: TaskStatus::Pending,
            completed_at: None,
            cancellation_reason: None,
        };
        self.lock()?.tasks.push(task.clone());
        Ok(task)
    }

    fn complete_task(&self, task_id: &str, completed_at: NaiveDateTime) -> Result<Task> {
        self.transition(task_id, |task| {
            task.status = TaskStatus::Completed;
            task.completed_at = Some(completed_at);
        })
    }

    fn cancel_task(&self, task_id: &str, reason: &str) -> Result<Task> {
        self.transition(task_id, |task| {
            task.status = TaskStatus::Cancelled;
            task.cancellation_reason = Some(reason.to_string());
        })
    }

    fn notification_settings(&self, user_id: UserId) -> Result<Option<NotificationSettings>> {
        Ok(self.lock()?.settings.get(&user_id).cloned())
    }
}
