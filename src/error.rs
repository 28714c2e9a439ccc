// Error types for the task store and its storage backends

use crate::models::TaskId;
use thiserror::Error;

/// Minimum number of characters in a task name
pub const MIN_NAME_LEN: usize = 3;

/// Failures raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to (de)serialize tasks: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to acquire lock on {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid slot name: {0} (must be alphanumeric with _/-)")]
    InvalidSlot(String),
}

/// Failures surfaced to callers of the task store
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Task name must be at least 3 characters long")]
    Validation,

    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Task {0} already exists")]
    DuplicateId(TaskId),

    #[error("Failed to fetch tasks from API")]
    SourceUnavailable,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = TodoError> = std::result::Result<T, E>;
