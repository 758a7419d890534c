//! Data layer: habits, the store that owns them, and their persistence.
//!
//! Habits live in memory inside a [`HabitStore`]; changes are mirrored to a
//! [`Backend`], either a JSON document or a SQLite database.

mod backend;
mod document;
mod models;
mod sqlite;
mod store;

pub use backend::{Backend, StorageError};
pub use document::DocumentBackend;
pub use models::{HabitSummary, WeeklyRow};
pub use sqlite::SqliteBackend;
pub use store::{AddOutcome, HabitStore, StoreError};
