//! # taskpulse-core
//!
//! Core library for taskpulse - personal task tracking with behavioral analytics.
//!
//! This library provides:
//! - Domain types for tasks, analytics snapshots and notification settings
//! - The [`TaskStore`] trait with SQLite and in-memory implementations
//! - The [`ProductivityAnalyzer`] that derives and persists per-user insights
//! - An LLM suggestion boundary with a static fallback
//! - Configuration management and logging infrastructure
//!
//! ## Data flow
//!
//! - **Source:** task rows written by the CLI (or any other client) into the store
//! - **Derived:** one analytics snapshot and one notification-settings row per
//!   user, overwritten on every analysis run
//!
//! ## Example
//!
//! ```rust,no_run
//! use taskpulse_core::{Config, Database, ProductivityAnalyzer};
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let analyzer = ProductivityAnalyzer::with_config(db, config.analysis.clone());
//! let snapshot = analyzer.run_full_analysis(config.user.default_id).expect("analysis failed");
//! println!("best hour: {}", snapshot.best_completion_hour);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::ProductivityAnalyzer;
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use store::{MemoryStore, TaskStore};
pub use types::*;

// Public modules
pub mod advisor;
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod types;
