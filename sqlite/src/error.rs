//! Error types for SQLite snippet operations.
//!
//! Provides a unified error type covering connection, query, migration, and
//! validation failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during SQLite snippet operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened.
    #[error("cannot open database '{}': {source}", path.display())]
    Unavailable {
        /// Database file that failed to open.
        path: PathBuf,
        /// Underlying SQLite failure.
        source: rusqlite::Error,
    },

    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Migration lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table name contains invalid characters.
    #[error("invalid table name '{0}': must contain only alphanumeric characters and underscores")]
    InvalidTable(String),

    /// The snippet table has not been created yet.
    #[error("table '{0}' does not exist; run `migrate up` first")]
    TablesMissing(String),

    /// Snippet data failed validation.
    #[error("invalid snippet: {0}")]
    Validation(#[from] snippets_core::ValidationError),

    /// Error loading a snippet bundle.
    #[error("bundle error: {0}")]
    Core(#[from] snippets_core::CoreError),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
