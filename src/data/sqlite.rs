//! SQLite persistence.
//!
//! Schema:
//! - `habits(id INTEGER PRIMARY KEY, name TEXT UNIQUE)`
//! - `completions(habit_id INTEGER, date TEXT, PRIMARY KEY(habit_id, date))`
//!
//! Every statement binds its values; nothing is spliced into SQL text.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};

use super::backend::{Backend, StorageError, StorageResult};
use super::models::{format_date, parse_date, Habit};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS habits (
        id   INTEGER PRIMARY KEY,
        name TEXT UNIQUE
    );
    CREATE TABLE IF NOT EXISTS completions (
        habit_id INTEGER,
        date     TEXT,
        PRIMARY KEY (habit_id, date)
    );
";

/// Backend storing habits and completions in two SQLite tables
pub struct SqliteBackend {
    conn: Connection,
    location: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: &Path) -> StorageResult<Self> {
        let started_at = Instant::now();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let result = Connection::open(path)
            .map_err(StorageError::from)
            .and_then(|conn| Self::from_connection(conn, Some(path.to_path_buf())));
        match &result {
            Ok(_) => info!(
                "event=backend_open backend=sqlite status=ok path={} duration_ms={}",
                path.display(),
                started_at.elapsed().as_millis()
            ),
            Err(e) => error!(
                "event=backend_open backend=sqlite status=error path={} error={e}",
                path.display()
            ),
        }
        result
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, location: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteBackend { conn, location })
    }

    fn habit_id(&self, name: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT id FROM habits WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id)
    }

    /// Id of `name`, inserting the row if an earlier write was lost
    fn ensure_habit_id(&self, name: &str) -> StorageResult<i64> {
        if let Some(id) = self.habit_id(name)? {
            return Ok(id);
        }
        self.conn
            .execute("INSERT OR IGNORE INTO habits (name) VALUES (?1)", [name])?;
        let id = self
            .conn
            .query_row("SELECT id FROM habits WHERE name = ?1", [name], |row| {
                row.get(0)
            })?;
        Ok(id)
    }
}

impl Backend for SqliteBackend {
    fn describe(&self) -> String {
        match &self.location {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }

    fn load_habits(&mut self) -> StorageResult<Vec<Habit>> {
        let mut habit_stmt = self
            .conn
            .prepare("SELECT id, name FROM habits ORDER BY id")?;
        let mut date_stmt = self
            .conn
            .prepare("SELECT date FROM completions WHERE habit_id = ?1")?;

        let rows = habit_stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let name: Option<String> = row.get(1)?;
            Ok((id, name))
        })?;

        let mut habits = Vec::new();
        for row in rows {
            let (id, name) = row?;
            let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
                warn!("event=backend_load backend=sqlite habit_id={id} reason=empty_name");
                continue;
            };

            let mut habit = Habit::new(name);
            let dates = date_stmt.query_map([id], |row| row.get::<_, String>(0))?;
            for raw in dates {
                let raw = raw?;
                match parse_date(&raw) {
                    Some(date) => habit.mark_completed_on(date),
                    None => warn!(
                        "event=backend_load backend=sqlite habit_id={id} \
                         reason=bad_date date={raw:?}"
                    ),
                }
            }
            habits.push(habit);
        }
        Ok(habits)
    }

    fn habit_added(&mut self, name: &str, _current: &[Habit]) -> StorageResult<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO habits (name) VALUES (?1)", [name])?;
        Ok(())
    }

    fn completion_set(
        &mut self,
        name: &str,
        date: NaiveDate,
        done: bool,
        _current: &[Habit],
    ) -> StorageResult<()> {
        let date = format_date(date);
        if done {
            let id = self.ensure_habit_id(name)?;
            self.conn.execute(
                "INSERT OR REPLACE INTO completions (habit_id, date) VALUES (?1, ?2)",
                params![id, date],
            )?;
        } else if let Some(id) = self.habit_id(name)? {
            self.conn.execute(
                "DELETE FROM completions WHERE habit_id = ?1 AND date = ?2",
                params![id, date],
            )?;
        }
        Ok(())
    }

    fn habit_removed(&mut self, name: &str, _current: &[Habit]) -> StorageResult<()> {
        let Some(id) = self.habit_id(name)? else {
            return Ok(());
        };
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM completions WHERE habit_id = ?1", [id])?;
        tx.execute("DELETE FROM habits WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(())
    }

    fn replace_all(&mut self, current: &[Habit]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM completions", [])?;
        tx.execute("DELETE FROM habits", [])?;
        {
            let mut insert_habit = tx.prepare("INSERT INTO habits (name) VALUES (?1)")?;
            let mut insert_date =
                tx.prepare("INSERT OR REPLACE INTO completions (habit_id, date) VALUES (?1, ?2)")?;
            for habit in current {
                insert_habit.execute([habit.name()])?;
                let id = tx.last_insert_rowid();
                for date in habit.completed_dates() {
                    insert_date.execute(params![id, format_date(date)])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
