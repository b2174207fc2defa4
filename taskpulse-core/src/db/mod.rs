//! Database layer for taskpulse
//!
//! This module provides the SQLite-backed task store with:
//! - Schema migrations
//! - Repository implementation of [`TaskStore`](crate::store::TaskStore)

pub mod repo;
pub mod schema;

pub use repo::Database;
