use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration {version} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// A stored column could not be decoded (JSON snapshot or timestamp).
    #[error("Corrupt row in '{table}': {reason}")]
    CorruptRow { table: &'static str, reason: String },

    #[error("Database lock poisoned")]
    LockPoisoned,
}
