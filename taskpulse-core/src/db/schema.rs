//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: tasks, notification settings, analytics snapshots
    r#"
    -- ============================================
    -- Source records
    -- ============================================

    CREATE TABLE IF NOT EXISTS tasks (
        id                  TEXT PRIMARY KEY,
        user_id             INTEGER NOT NULL,
        task_description    TEXT NOT NULL,
        task_date           TEXT NOT NULL,           -- YYYY-MM-DD
        status              TEXT NOT NULL DEFAULT 'pending'
                            CHECK (status IN ('pending', 'completed', 'cancelled')),
        completed_at        TEXT,                    -- local wall clock, ISO 8601
        cancellation_reason TEXT,
        created_at          TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS notification_settings (
        user_id                    INTEGER PRIMARY KEY,
        morning_notification_time  TEXT NOT NULL,    -- HH:MM:SS
        reminder_notification_time TEXT NOT NULL,    -- HH:MM:SS
        last_adjusted_at           TEXT NOT NULL
    );

    -- ============================================
    -- Derived (one snapshot per user, overwritten)
    -- ============================================

    CREATE TABLE IF NOT EXISTS user_behavior_analytics (
        user_id                         INTEGER PRIMARY KEY,
        best_completion_hour            INTEGER NOT NULL,
        worst_completion_hour           INTEGER NOT NULL,
        best_day_of_week                INTEGER NOT NULL,
        worst_day_of_week               INTEGER NOT NULL,
        avg_completion_rate             REAL NOT NULL,
        most_common_cancellation_reason TEXT NOT NULL,
        optimal_reminder_time           TEXT NOT NULL,
        productivity_score              REAL NOT NULL,
        analysis_date                   TEXT NOT NULL
    );

    -- ============================================
    -- Indexes
    -- ============================================

    CREATE INDEX IF NOT EXISTS idx_tasks_user_date ON tasks(user_id, task_date DESC);
    CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(user_id, status);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations twice - should be idempotent
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let tables = ["tasks", "notification_settings", "user_behavior_analytics"];

        for table in tables {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_status_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO tasks (id, user_id, task_description, task_date, status, created_at)
             VALUES ('t1', 1, 'x', '2026-10-19', 'done', '2026-10-19T08:00:00')",
            [],
        );
        assert!(result.is_err(), "unknown status should be rejected");
    }
}
