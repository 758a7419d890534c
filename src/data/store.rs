//! The habit store: owns every habit and mirrors changes to a backend.
//!
//! Mutations are applied to memory first and then handed to the backend, if
//! one is attached. When the backend write fails the in-memory change is
//! kept and reported through [`StoreError::Backend`], so callers can tell the
//! two have diverged.

use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info, warn};
use thiserror::Error;

use super::backend::{Backend, StorageError, StorageResult};
use super::document::{read_snapshot, write_snapshot};
use super::models::{today, Habit, HabitSummary, WeeklyRow};

/// Reasons a store operation did not fully succeed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("habit name must not be empty")]
    EmptyName,

    #[error("habit not found: {0}")]
    NotFound(String),

    #[error("no backend attached")]
    NoBackend,

    /// Reading or writing the backend failed. For mutations the in-memory
    /// change has already been applied.
    #[error("{backend} failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: StorageError,
    },

    #[error("snapshot failed: {0}")]
    Snapshot(#[source] StorageError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of adding a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// In-memory habit collection, in insertion order, keyed by unique name
#[derive(Default)]
pub struct HabitStore {
    habits: Vec<Habit>,
    backend: Option<Box<dyn Backend>>,
}

impl HabitStore {
    /// Create an empty store with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store mirroring its changes to `backend`
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        HabitStore {
            habits: Vec::new(),
            backend: Some(backend),
        }
    }

    /// Description of the attached backend, if any
    pub fn backend_name(&self) -> Option<String> {
        self.backend.as_ref().map(|b| b.describe())
    }

    /// Read-only view of all habits, in insertion order
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn find(&self, name: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.name() == name)
    }

    fn position(&self, name: &str) -> StoreResult<usize> {
        self.habits
            .iter()
            .position(|h| h.name() == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Run `write` against the backend, wrapping failures as divergence
    fn mirror<F>(&mut self, write: F) -> StoreResult<()>
    where
        F: FnOnce(&mut dyn Backend, &[Habit]) -> StorageResult<()>,
    {
        let Some(backend) = self.backend.as_deref_mut() else {
            return Ok(());
        };
        write(backend, &self.habits).map_err(|source| {
            warn!(
                "event=backend_write status=error backend={} error={source}",
                backend.describe()
            );
            StoreError::Backend {
                backend: backend.describe(),
                source,
            }
        })
    }

    /// Add a new habit. Surrounding whitespace is dropped from the name;
    /// adding an existing name changes nothing.
    pub fn add_habit(&mut self, name: &str) -> StoreResult<AddOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.find(name).is_some() {
            debug!("event=habit_add status=exists name={name}");
            return Ok(AddOutcome::AlreadyExists);
        }

        self.habits.push(Habit::new(name));
        info!("event=habit_add status=ok name={name}");
        self.mirror(|backend, current| backend.habit_added(name, current))?;
        Ok(AddOutcome::Added)
    }

    /// Mark today done for `name`
    pub fn mark_completed_today(&mut self, name: &str) -> StoreResult<()> {
        self.set_completion(name, today(), true)
    }

    /// Set or clear today's completion for `name`
    pub fn set_today(&mut self, name: &str, done: bool) -> StoreResult<()> {
        self.set_completion(name, today(), done)
    }

    fn set_completion(&mut self, name: &str, date: NaiveDate, done: bool) -> StoreResult<()> {
        let idx = self.position(name)?;
        let habit = &mut self.habits[idx];
        if done {
            habit.mark_completed_on(date);
        } else {
            habit.unmark_on(date);
        }
        info!("event=completion_set name={name} date={date} done={done}");
        self.mirror(|backend, current| backend.completion_set(name, date, done, current))
    }

    /// Remove a habit and its completion history
    pub fn remove_habit(&mut self, name: &str) -> StoreResult<()> {
        let idx = self.position(name)?;
        self.habits.remove(idx);
        info!("event=habit_remove status=ok name={name}");
        self.mirror(|backend, current| backend.habit_removed(name, current))
    }

    /// Name, streak and today's state for every habit
    pub fn list(&self) -> Vec<HabitSummary> {
        let day = today();
        self.habits
            .iter()
            .map(|h| HabitSummary {
                name: h.name().to_string(),
                streak: h.streak_ending(day),
                done_today: h.is_completed_on(day),
            })
            .collect()
    }

    /// Streak plus the last seven days, oldest first, for every habit
    pub fn weekly_report(&self) -> Vec<WeeklyRow> {
        let day = today();
        self.habits
            .iter()
            .map(|h| WeeklyRow {
                name: h.name().to_string(),
                streak: h.streak_ending(day),
                days: h.week_ending(day),
            })
            .collect()
    }

    /// Write every habit to a JSON snapshot at `path`
    pub fn save_snapshot(&self, path: &Path) -> StorageResult<()> {
        write_snapshot(path, &self.habits)?;
        info!(
            "event=snapshot_save status=ok path={} habits={}",
            path.display(),
            self.habits.len()
        );
        Ok(())
    }

    /// Replace every habit with the contents of the snapshot at `path`.
    ///
    /// Returns the number of habits loaded. An attached backend is
    /// overwritten with the loaded collection.
    pub fn load_snapshot(&mut self, path: &Path) -> StoreResult<usize> {
        let habits = read_snapshot(path).map_err(StoreError::Snapshot)?;
        self.habits = habits;
        info!(
            "event=snapshot_load status=ok path={} habits={}",
            path.display(),
            self.habits.len()
        );
        self.mirror(|backend, current| backend.replace_all(current))?;
        Ok(self.habits.len())
    }

    /// Replace every habit with what the backend holds, completions included
    pub fn load_from_backend(&mut self) -> StoreResult<usize> {
        let backend = self.backend.as_deref_mut().ok_or(StoreError::NoBackend)?;
        let habits = backend.load_habits().map_err(|source| StoreError::Backend {
            backend: backend.describe(),
            source,
        })?;
        info!(
            "event=backend_load status=ok backend={} habits={} completions={}",
            backend.describe(),
            habits.len(),
            habits.iter().map(Habit::completion_count).sum::<usize>()
        );
        self.habits = habits;
        Ok(self.habits.len())
    }

    /// Load from the backend; if that fails, detach it so later changes
    /// stay in memory instead of overwriting what could not be read
    pub fn load_or_detach(&mut self) -> StoreResult<usize> {
        self.load_from_backend().inspect_err(|e| {
            if let Some(backend) = self.detach_backend() {
                warn!(
                    "event=backend_detach backend={} reason=load_failed error={e}",
                    backend.describe()
                );
            }
        })
    }

    /// Stop mirroring changes, handing back the backend that was attached
    pub fn detach_backend(&mut self) -> Option<Box<dyn Backend>> {
        self.backend.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DocumentBackend, SqliteBackend};

    /// Backend that fails every write
    struct BrokenBackend;

    impl Backend for BrokenBackend {
        fn describe(&self) -> String {
            "broken".to_string()
        }

        fn load_habits(&mut self) -> StorageResult<Vec<Habit>> {
            Err(StorageError::Malformed {
                path: "broken".into(),
                reason: "unreadable".to_string(),
            })
        }

        fn habit_added(&mut self, _: &str, _: &[Habit]) -> StorageResult<()> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn completion_set(
            &mut self,
            _: &str,
            _: NaiveDate,
            _: bool,
            _: &[Habit],
        ) -> StorageResult<()> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn habit_removed(&mut self, _: &str, _: &[Habit]) -> StorageResult<()> {
            Err(rusqlite::Error::InvalidQuery.into())
        }

        fn replace_all(&mut self, _: &[Habit]) -> StorageResult<()> {
            Err(rusqlite::Error::InvalidQuery.into())
        }
    }

    #[test]
    fn test_add_duplicate_reports_already_exists() {
        let mut store = HabitStore::new();
        assert_eq!(store.add_habit("X").unwrap(), AddOutcome::Added);
        assert_eq!(store.add_habit("X").unwrap(), AddOutcome::AlreadyExists);

        let count = store.habits().iter().filter(|h| h.name() == "X").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut store = HabitStore::new();
        store.add_habit("read").unwrap();
        assert_eq!(store.add_habit("Read").unwrap(), AddOutcome::Added);
        assert_eq!(store.habits().len(), 2);
    }

    #[test]
    fn test_add_trims_surrounding_whitespace() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        assert_eq!(store.add_habit(" Read ").unwrap(), AddOutcome::AlreadyExists);

        store.add_habit("  Walk").unwrap();
        assert!(store.find("Walk").is_some());
        assert_eq!(store.habits().len(), 2);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut store = HabitStore::new();
        assert!(matches!(store.add_habit(""), Err(StoreError::EmptyName)));
        assert!(matches!(store.add_habit("   "), Err(StoreError::EmptyName)));
        assert!(store.habits().is_empty());
    }

    #[test]
    fn test_unknown_habit_is_not_found() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();

        assert!(matches!(
            store.mark_completed_today("Walk"),
            Err(StoreError::NotFound(name)) if name == "Walk"
        ));
        assert!(matches!(store.set_today("Walk", true), Err(StoreError::NotFound(_))));
        assert!(matches!(store.remove_habit("Walk"), Err(StoreError::NotFound(_))));
        assert!(!store.find("Read").unwrap().is_completed_today());
    }

    #[test]
    fn test_mark_then_list() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        store.mark_completed_today("Read").unwrap();

        assert_eq!(
            store.list(),
            vec![HabitSummary {
                name: "Read".to_string(),
                streak: 1,
                done_today: true,
            }]
        );

        store.set_today("Read", false).unwrap();
        let rows = store.list();
        assert_eq!(rows[0].streak, 0);
        assert!(!rows[0].done_today);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let mut store = HabitStore::new();
        for name in ["Walk", "Read", "Stretch"] {
            store.add_habit(name).unwrap();
        }
        let names: Vec<_> = store.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Walk", "Read", "Stretch"]);
    }

    #[test]
    fn test_weekly_report_matches_completions() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        store.add_habit("Walk").unwrap();
        store.set_today("Read", true).unwrap();

        let report = store.weekly_report();
        assert_eq!(report.len(), 2);
        for row in &report {
            let habit = store.find(&row.name).unwrap();
            assert_eq!(row.days.len(), 7);
            assert_eq!(row.days[6].date, today());
            assert!(row.days.windows(2).all(|w| w[0].date < w[1].date));
            for mark in &row.days {
                assert_eq!(mark.done, habit.is_completed_on(mark.date));
            }
        }
        assert_eq!(report[0].streak, 1);
        assert!(report[0].days[6].done);
        assert!(!report[1].days[6].done);
    }

    #[test]
    fn test_remove_habit() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        store.add_habit("Walk").unwrap();

        store.remove_habit("Read").unwrap();
        assert!(store.find("Read").is_none());
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn test_snapshot_roundtrip_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        store.add_habit("Walk").unwrap();
        store.mark_completed_today("Read").unwrap();
        store.save_snapshot(&path).unwrap();

        let mut fresh = HabitStore::new();
        fresh.add_habit("Stale").unwrap();
        assert_eq!(fresh.load_snapshot(&path).unwrap(), 2);
        assert_eq!(fresh.habits(), store.habits());
        assert!(fresh.find("Stale").is_none());
    }

    #[test]
    fn test_load_snapshot_missing_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();

        let result = store.load_snapshot(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(StoreError::Snapshot(StorageError::Io { .. }))));
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn test_operations_without_backend() {
        let mut store = HabitStore::new();
        assert!(store.backend_name().is_none());
        assert!(matches!(store.load_from_backend(), Err(StoreError::NoBackend)));

        store.add_habit("Read").unwrap();
        store.set_today("Read", true).unwrap();
        store.remove_habit("Read").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_sqlite_backend_reload_restores_streaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.db");

        {
            let backend = SqliteBackend::open(&path).unwrap();
            let mut store = HabitStore::with_backend(Box::new(backend));
            store.add_habit("Read").unwrap();
            store.add_habit("Walk").unwrap();
            store.mark_completed_today("Read").unwrap();
            store.set_today("Walk", true).unwrap();
            store.set_today("Walk", false).unwrap();
        }

        let backend = SqliteBackend::open(&path).unwrap();
        let mut store = HabitStore::with_backend(Box::new(backend));
        assert_eq!(store.load_from_backend().unwrap(), 2);

        let rows = store.list();
        assert_eq!(rows[0].name, "Read");
        assert_eq!(rows[0].streak, 1);
        assert!(rows[0].done_today);
        assert_eq!(rows[1].streak, 0);
    }

    #[test]
    fn test_sqlite_backend_remove_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("export.json");

        let mut source = HabitStore::new();
        source.add_habit("Journal").unwrap();
        source.mark_completed_today("Journal").unwrap();
        source.save_snapshot(&snapshot).unwrap();

        let backend = SqliteBackend::open_in_memory().unwrap();
        let mut store = HabitStore::with_backend(Box::new(backend));
        store.add_habit("Read").unwrap();
        store.remove_habit("Read").unwrap();
        store.load_snapshot(&snapshot).unwrap();

        store.load_from_backend().unwrap();
        assert_eq!(store.habits(), source.habits());
    }

    #[test]
    fn test_document_backend_mirrors_every_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");

        let mut store = HabitStore::with_backend(Box::new(DocumentBackend::new(path.clone())));
        store.add_habit("Read").unwrap();
        store.mark_completed_today("Read").unwrap();

        let mut reloaded = HabitStore::with_backend(Box::new(DocumentBackend::new(path)));
        reloaded.load_from_backend().unwrap();
        assert_eq!(reloaded.habits(), store.habits());
    }

    #[test]
    fn test_unreadable_document_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        let original = r#"[{"name": "Read", "dates": []}, {"name": "Walk", "dates": []},]"#;
        std::fs::write(&path, original).unwrap();

        let mut store = HabitStore::with_backend(Box::new(DocumentBackend::new(path.clone())));
        assert!(matches!(store.load_or_detach(), Err(StoreError::Backend { .. })));
        assert!(store.backend_name().is_none());

        store.add_habit("Stretch").unwrap();
        store.mark_completed_today("Stretch").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_load_or_detach_keeps_working_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");

        let mut store = HabitStore::with_backend(Box::new(DocumentBackend::new(path.clone())));
        assert_eq!(store.load_or_detach().unwrap(), 0);
        assert!(store.backend_name().is_some());

        store.add_habit("Read").unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), store.habits());
    }

    #[test]
    fn test_backend_failure_is_reported_after_memory_change() {
        let mut store = HabitStore::with_backend(Box::new(BrokenBackend));

        assert!(matches!(store.add_habit("Read"), Err(StoreError::Backend { .. })));
        assert!(store.find("Read").is_some());

        assert!(matches!(
            store.mark_completed_today("Read"),
            Err(StoreError::Backend { .. })
        ));
        assert!(store.find("Read").unwrap().is_completed_today());

        assert!(matches!(store.load_from_backend(), Err(StoreError::Backend { .. })));
        assert_eq!(store.habits().len(), 1);
    }
}
