//! taskpulse - record daily tasks and analyze how you get through them
//!
//! Thin command-line layer over `taskpulse-core`: every command opens the
//! configured SQLite store, performs one operation and prints the result.

mod render;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use taskpulse_core::advisor::{create_suggestion_client, suggest_optimization, SuggestionClient};
use taskpulse_core::{Config, Database, NewTask, ProductivityAnalyzer, TaskStatus, TaskStore};

#[derive(Parser)]
#[command(name = "taskpulse")]
#[command(about = "Personal task tracking with productivity analytics")]
#[command(version)]
struct Args {
    /// User to act for (defaults to [user] default_id in config)
    #[arg(short, long, global = true)]
    user: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new pending task
    Add {
        /// What needs doing
        description: String,

        /// Day the task is planned for (YYYY-MM-DD, default today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Mark a task completed
    Done {
        task_id: String,

        /// Completion time (YYYY-MM-DDTHH:MM[:SS], default now)
        #[arg(long, value_parser = parse_datetime)]
        at: Option<NaiveDateTime>,
    },

    /// Cancel a task, recording why
    Cancel {
        task_id: String,

        /// Why the task was dropped
        #[arg(short, long)]
        reason: String,
    },

    /// List tasks, newest day first
    List {
        /// Earliest task date (inclusive)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Latest task date (inclusive)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Show only pending tasks
        #[arg(long)]
        pending: bool,
    },

    /// Run the productivity analysis and store the snapshot
    Analyze {
        /// Analysis date (YYYY-MM-DD, default today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the latest snapshot with suggestions
    Insights {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM[:SS], got {s:?}"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        taskpulse_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = config.resolved_database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    db.migrate().context("failed to run database migrations")?;

    let user_id = args.user.unwrap_or(config.user.default_id);
    tracing::debug!(user_id, db = %db_path.display(), "Starting command");

    match args.command {
        Command::Add { description, date } => {
            let task = db
                .add_task(&NewTask {
                    user_id,
                    description,
                    task_date: date.unwrap_or_else(|| Local::now().date_naive()),
                })
                .context("failed to add task")?;
            println!(
                "Added task {} for {}: {}",
                task.id, task.task_date, task.description
            );
        }
        Command::Done { task_id, at } => {
            let at = at.unwrap_or_else(|| Local::now().naive_local());
            let task = db
                .complete_task(&task_id, at)
                .context("failed to complete task")?;
            println!("Completed task {} at {}", task.id, at.format("%Y-%m-%d %H:%M"));
        }
        Command::Cancel { task_id, reason } => {
            let task = db
                .cancel_task(&task_id, &reason)
                .context("failed to cancel task")?;
            println!("Cancelled task {} ({})", task.id, reason);
        }
        Command::List { from, to, pending } => {
            let tasks = db
                .fetch_tasks(user_id, from, to)
                .context("failed to list tasks")?;
            let tasks: Vec<_> = tasks
                .into_iter()
                .filter(|t| !pending || t.status == TaskStatus::Pending)
                .collect();

            if tasks.is_empty() {
                println!("No tasks found.");
            }
            for task in &tasks {
                println!("{}", render::task_line(task));
            }
        }
        Command::Analyze { date, format } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let analyzer = ProductivityAnalyzer::with_config(db, config.analysis.clone());
            let snapshot = analyzer
                .run_full_analysis_on(user_id, today)
                .context("analysis failed")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                OutputFormat::Text => print!("{}", render::snapshot_text(&snapshot)),
            }
        }
        Command::Insights { format } => {
            let Some(snapshot) = db
                .latest_analytics_snapshot(user_id)
                .context("failed to load analytics snapshot")?
            else {
                println!("No analysis yet for user {user_id}. Run 'taskpulse analyze' first.");
                return Ok(());
            };

            let client: Option<Box<dyn SuggestionClient>> =
                match config.llm.as_ref().map(create_suggestion_client) {
                    Some(Ok(client)) => Some(client),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Suggestion client unavailable");
                        None
                    }
                    None => None,
                };
            let suggestion = suggest_optimization(client.as_deref(), &snapshot);

            match format {
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "snapshot": snapshot,
                        "suggestion": suggestion,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Text => {
                    print!("{}", render::snapshot_text(&snapshot));
                    println!();
                    println!("Suggestions:");
                    println!("{}", suggestion);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 10, 13)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2026-10-13T09:30").unwrap(), expected);
        assert_eq!(parse_datetime("2026-10-13T09:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2026-10-13 09:30").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-10-19").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
        assert!(parse_date("19/10/2026").is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
