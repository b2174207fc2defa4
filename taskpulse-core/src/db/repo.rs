//! Database repository layer
//!
//! SQLite implementation of [`TaskStore`]. Dates and times are stored as
//! ISO 8601 text so rows stay readable from the `sqlite3` shell.

use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::types::*;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const TIME_FORMAT: &str = "%H:%M:%S";

const TASK_COLUMNS: &str =
    "id, user_id, task_description, task_date, status, completed_at, cancellation_reason";

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.connection()?;
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("database connection mutex poisoned".to_string()))
    }

    /// Look up a single task by id
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let conn = self.connection()?;
        Self::query_task(&conn, task_id)
    }

    /// Count every task stored for a user
    pub fn count_tasks(&self, user_id: UserId) -> Result<i64> {
        let conn = self.connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_id = ?1",
            [user_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    // ============================================
    // Row mapping
    // ============================================

    fn query_task(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let task = conn
            .query_row(&sql, [task_id], Self::row_to_task)
            .optional()?;
        Ok(task)
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
        let status_str: String = row.get("status")?;
        let task_date_str: String = row.get("task_date")?;
        let completed_at_str: Option<String> = row.get("completed_at")?;

        Ok(Task {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            description: row.get("task_description")?,
            task_date: parse_date(&task_date_str)?,
            status: status_str.parse().map_err(conversion_error)?,
            completed_at: completed_at_str
                .as_deref()
                .map(parse_datetime)
                .transpose()?,
            cancellation_reason: row.get("cancellation_reason")?,
        })
    }

    fn row_to_snapshot(row: &Row) -> rusqlite::Result<AnalyticsSnapshot> {
        let reminder_str: String = row.get("optimal_reminder_time")?;
        let analysis_date_str: String = row.get("analysis_date")?;

        Ok(AnalyticsSnapshot {
            user_id: row.get("user_id")?,
            best_completion_hour: row.get("best_completion_hour")?,
            worst_completion_hour: row.get("worst_completion_hour")?,
            best_day_of_week: row.get("best_day_of_week")?,
            worst_day_of_week: row.get("worst_day_of_week")?,
            avg_completion_rate: row.get("avg_completion_rate")?,
            most_common_cancellation_reason: row.get("most_common_cancellation_reason")?,
            optimal_reminder_time: parse_time(&reminder_str)?,
            productivity_score: row.get("productivity_score")?,
            analysis_date: parse_date(&analysis_date_str)?,
        })
    }

    fn row_to_settings(row: &Row) -> rusqlite::Result<NotificationSettings> {
        let morning_str: String = row.get("morning_notification_time")?;
        let reminder_str: String = row.get("reminder_notification_time")?;
        let adjusted_str: String = row.get("last_adjusted_at")?;

        Ok(NotificationSettings {
            user_id: row.get("user_id")?,
            morning_notification_time: parse_time(&morning_str)?,
            reminder_notification_time: parse_time(&reminder_str)?,
            last_adjusted_at: parse_datetime(&adjusted_str)?,
        })
    }

    fn query_snapshot(conn: &Connection, user_id: UserId) -> Result<Option<AnalyticsSnapshot>> {
        let snapshot = conn
            .query_row(
                r#"
                SELECT * FROM user_behavior_analytics
                WHERE user_id = ?1
                ORDER BY analysis_date DESC
                LIMIT 1
                "#,
                [user_id],
                Self::row_to_snapshot,
            )
            .optional()?;
        Ok(snapshot)
    }

    fn query_settings(conn: &Connection, user_id: UserId) -> Result<Option<NotificationSettings>> {
        let settings = conn
            .query_row(
                "SELECT * FROM notification_settings WHERE user_id = ?1",
                [user_id],
                Self::row_to_settings,
            )
            .optional()?;
        Ok(settings)
    }

    /// Explain why a pending-only update touched no rows.
    fn transition_error(conn: &Connection, task_id: &str) -> Error {
        match Self::query_task(conn, task_id) {
            Ok(Some(task)) => Error::InvalidTransition {
                id: task.id,
                status: task.status,
            },
            Ok(None) => Error::TaskNotFound(task_id.to_string()),
            Err(e) => e,
        }
    }
}

impl TaskStore for Database {
    fn fetch_tasks(
        &self,
        user_id: UserId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Task>> {
        let conn = self.connection()?;

        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1");
        let mut args: Vec<String> = Vec::new();
        if let Some(start) = start {
            args.push(start.format(DATE_FORMAT).to_string());
            sql.push_str(&format!(" AND task_date >= ?{}", args.len() + 1));
        }
        if let Some(end) = end {
            args.push(end.format(DATE_FORMAT).to_string());
            sql.push_str(&format!(" AND task_date <= ?{}", args.len() + 1));
        }
        sql.push_str(" ORDER BY task_date DESC, created_at ASC");

        let mut stmt = conn.prepare(&sql)?;
        let mut bound: Vec<&dyn rusqlite::ToSql> = vec![&user_id];
        bound.extend(args.iter().map(|a| a as &dyn rusqlite::ToSql));

        let tasks = stmt
            .query_map(bound.as_slice(), Self::row_to_task)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(user_id, count = tasks.len(), ?start, ?end, "Fetched tasks");
        Ok(tasks)
    }

    fn upsert_analytics_snapshot(
        &self,
        snapshot: &AnalyticsSnapshot,
    ) -> Result<AnalyticsSnapshot> {
        let conn = self.connection()?;
        conn.execute(
            r#"
            INSERT INTO user_behavior_analytics (
                user_id, best_completion_hour, worst_completion_hour,
                best_day_of_week, worst_day_of_week, avg_completion_rate,
                most_common_cancellation_reason, optimal_reminder_time,
                productivity_score, analysis_date
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(user_id) DO UPDATE SET
                best_completion_hour = excluded.best_completion_hour,
                worst_completion_hour = excluded.worst_completion_hour,
                best_day_of_week = excluded.best_day_of_week,
                worst_day_of_week = excluded.worst_day_of_week,
                avg_completion_rate = excluded.avg_completion_rate,
                most_common_cancellation_reason = excluded.most_common_cancellation_reason,
                optimal_reminder_time = excluded.optimal_reminder_time,
                productivity_score = excluded.productivity_score,
                analysis_date = excluded.analysis_date
            "#,
            params![
                snapshot.user_id,
                snapshot.best_completion_hour,
                snapshot.worst_completion_hour,
                snapshot.best_day_of_week,
                snapshot.worst_day_of_week,
                snapshot.avg_completion_rate,
                snapshot.most_common_cancellation_reason,
                snapshot.optimal_reminder_time.format(TIME_FORMAT).to_string(),
                snapshot.productivity_score,
                snapshot.analysis_date.format(DATE_FORMAT).to_string(),
            ],
        )?;

        Self::query_snapshot(&conn, snapshot.user_id)?.ok_or_else(|| {
            Error::Store(format!(
                "snapshot for user {} missing after upsert",
                snapshot.user_id
            ))
        })
    }

    fn upsert_notification_settings(
        &self,
        user_id: UserId,
        morning: NaiveTime,
        reminder: NaiveTime,
    ) -> Result<NotificationSettings> {
        let conn = self.connection()?;
        let adjusted_at = Local::now().naive_local();
        conn.execute(
            r#"
            INSERT INTO notification_settings (
                user_id, morning_notification_time, reminder_notification_time, last_adjusted_at
            )
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                morning_notification_time = excluded.morning_notification_time,
                reminder_notification_time = excluded.reminder_notification_time,
                last_adjusted_at = excluded.last_adjusted_at
            "#,
            params![
                user_id,
                morning.format(TIME_FORMAT).to_string(),
                reminder.format(TIME_FORMAT).to_string(),
                adjusted_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        Self::query_settings(&conn, user_id)?.ok_or_else(|| {
            Error::Store(format!(
                "notification settings for user {} missing after upsert",
                user_id
            ))
        })
    }

    fn latest_analytics_snapshot(&self, user_id: UserId) -> Result<Option<AnalyticsSnapshot>> {
        let conn = self.connection()?;
        Self::query_snapshot(&conn, user_id)
    }

    fn add_task(&self, task: &NewTask) -> Result<Task> {
        let conn = self.connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        conn.execute(
            r#"
            INSERT INTO tasks (id, user_id, task_description, task_date, status, created_at)
            VALUES (?1, ?2, ?3, ?4, 'pending', ?5)
            "#,
            params![
                id,
                task.user_id,
                task.description,
                task.task_date.format(DATE_FORMAT).to_string(),
                Local::now().naive_local().format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        Self::query_task(&conn, &id)?.ok_or(Error::TaskNotFound(id))
    }

    fn complete_task(&self, task_id: &str, completed_at: NaiveDateTime) -> Result<Task> {
        let conn = self.connection()?;
        let changed = conn.execute(
            r#"
            UPDATE tasks SET status = 'completed', completed_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
            params![task_id, completed_at.format(DATETIME_FORMAT).to_string()],
        )?;
        if changed == 0 {
            return Err(Self::transition_error(&conn, task_id));
        }

        Self::query_task(&conn, task_id)?.ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    fn cancel_task(&self, task_id: &str, reason: &str) -> Result<Task> {
        let conn = self.connection()?;
        let changed = conn.execute(
            r#"
            UPDATE tasks SET status = 'cancelled', cancellation_reason = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
            params![task_id, reason],
        )?;
        if changed == 0 {
            return Err(Self::transition_error(&conn, task_id));
        }

        Self::query_task(&conn, task_id)?.ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    fn notification_settings(&self, user_id: UserId) -> Result<Option<NotificationSettings>> {
        let conn = self.connection()?;
        Self::query_settings(&conn, user_id)
    }
}

fn conversion_error(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, message.into())
}

fn parse_date(s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| conversion_error(format!("invalid date {:?}: {}", s, e)))
}

fn parse_datetime(s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map_err(|e| conversion_error(format!("invalid timestamp {:?}: {}", s, e)))
}

fn parse_time(s: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| conversion_error(format!("invalid time {:?}: {}", s, e)))
}
