use rusqlite::ffi;

/// Errors that can occur in the persistence layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The directory that should hold the database file is missing
    #[error("Database directory does not exist: {}", .0.display())]
    MissingDirectory(std::path::PathBuf),
}

impl StoreError {
    /// Whether this error is a UNIQUE or PRIMARY KEY constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(error, _)) => matches!(
                error.extended_code,
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            ),
            _ => false,
        }
    }
}
