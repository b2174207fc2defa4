//! Error types for taskpulse-core

use thiserror::Error;

use crate::types::TaskStatus;

/// Main error type for the taskpulse-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Task not found
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Completed and cancelled tasks are terminal
    #[error("task {id} is already {status}")]
    InvalidTransition { id: String, status: TaskStatus },

    /// A stored value could not be decoded into a domain type
    #[error("invalid stored data: {0}")]
    InvalidData(String),

    /// Store backend failure that has no more specific variant
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias for taskpulse-core
pub type Result<T> = std::result::Result<T, Error>;
