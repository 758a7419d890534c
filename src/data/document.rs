//! JSON document persistence.
//!
//! Snapshot format: an array of `{ "name": <string>, "dates": ["YYYY-MM-DD", ...] }`.
//! Records that cannot be read (missing name, bad date) are skipped with a
//! warning; a document that is not an array fails the whole load.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{info, warn};

use super::backend::{Backend, StorageError, StorageResult};
use super::models::Habit;

/// Read all habits from a snapshot file
pub fn read_snapshot(path: &Path) -> StorageResult<Vec<Habit>> {
    read_snapshot_counted(path).map(|(habits, _)| habits)
}

/// Read a snapshot, also returning how many records were skipped
fn read_snapshot_counted(path: &Path) -> StorageResult<(Vec<Habit>, usize)> {
    let raw = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            return Err(StorageError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let mut skipped = 0;
    let mut seen = HashSet::new();
    let mut habits = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Habit>(value) {
            Ok(habit) => {
                if seen.insert(habit.name().to_string()) {
                    habits.push(habit);
                } else {
                    skipped += 1;
                    warn!(
                        "event=snapshot_record_skipped path={} index={idx} \
                         reason=duplicate_name name={}",
                        path.display(),
                        habit.name()
                    );
                }
            }
            Err(e) => {
                skipped += 1;
                warn!(
                    "event=snapshot_record_skipped path={} index={idx} reason=malformed error={e}",
                    path.display()
                );
            }
        }
    }
    Ok((habits, skipped))
}

/// Write all habits to a snapshot file.
///
/// Data goes to a sibling `.tmp` file that is renamed over `path`, so a
/// failed write never leaves a truncated snapshot behind.
pub fn write_snapshot(path: &Path, habits: &[Habit]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(habits)?;
    let tmp = sibling_path(path, ".tmp");
    let written = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(StorageError::io(path, e));
    }
    Ok(())
}

/// `path` with `suffix` appended to its file name
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("habits"));
    name.push(suffix);
    path.with_file_name(name)
}

/// Backend keeping the whole collection in a single JSON document
pub struct DocumentBackend {
    path: PathBuf,
}

impl DocumentBackend {
    pub fn new(path: PathBuf) -> Self {
        DocumentBackend { path }
    }
}

impl Backend for DocumentBackend {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn load_habits(&mut self) -> StorageResult<Vec<Habit>> {
        if !self.path.exists() {
            info!(
                "event=snapshot_load path={} status=missing habits=0",
                self.path.display()
            );
            return Ok(Vec::new());
        }
        let (habits, skipped) = read_snapshot_counted(&self.path)?;
        if skipped > 0 {
            // The next write drops skipped records, keep the document as it was
            let backup = sibling_path(&self.path, ".bak");
            fs::copy(&self.path, &backup).map_err(|e| StorageError::io(&backup, e))?;
            warn!(
                "event=snapshot_backup path={} skipped={skipped} backup={}",
                self.path.display(),
                backup.display()
            );
        }
        Ok(habits)
    }

    fn habit_added(&mut self, _name: &str, current: &[Habit]) -> StorageResult<()> {
        write_snapshot(&self.path, current)
    }

    fn completion_set(
        &mut self,
        _name: &str,
        _date: NaiveDate,
        _done: bool,
        current: &[Habit],
    ) -> StorageResult<()> {
        write_snapshot(&self.path, current)
    }

    fn habit_removed(&mut self, _name: &str, current: &[Habit]) -> StorageResult<()> {
        write_snapshot(&self.path, current)
    }

    fn replace_all(&mut self, current: &[Habit]) -> StorageResult<()> {
        write_snapshot(&self.path, current)
    }
}
