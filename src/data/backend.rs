//! Persistence interface shared by the JSON document and SQLite backends.
//!
//! The store applies every mutation in memory first and then hands it to the
//! backend. Backends receive the already-updated collection so that
//! whole-document formats can rewrite themselves while row-oriented ones
//! apply just the change.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use super::models::Habit;

/// Errors raised while reading or writing persisted habits
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed snapshot {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A persistence mechanism mirroring the in-memory habit collection
pub trait Backend {
    /// Short human-readable description, e.g. `sqlite:/path/habits.db`
    fn describe(&self) -> String;

    /// Read every habit with its full completion history, in insertion order
    fn load_habits(&mut self) -> StorageResult<Vec<Habit>>;

    /// A habit named `name` was appended to `current`
    fn habit_added(&mut self, name: &str, current: &[Habit]) -> StorageResult<()>;

    /// `name`'s completion on `date` was set to `done`
    fn completion_set(
        &mut self,
        name: &str,
        date: NaiveDate,
        done: bool,
        current: &[Habit],
    ) -> StorageResult<()>;

    /// The habit `name` and its completions were removed from `current`
    fn habit_removed(&mut self, name: &str, current: &[Habit]) -> StorageResult<()>;

    /// Replace everything persisted with `current`
    fn replace_all(&mut self, current: &[Habit]) -> StorageResult<()>;
}
