//! Numbered text menu and plain-text renderings of the store.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::{AddOutcome, HabitStore, HabitSummary, StoreError, WeeklyRow};

const MENU: &str = "\
=== Habit Tracker ===
1) Add habit
2) Mark habit done today
3) Unmark habit for today
4) List habits
5) Weekly report
6) Remove habit
7) Export snapshot
8) Import snapshot
0) Quit";

/// Write one line per habit: name, streak and today's state
pub fn write_list(out: &mut impl Write, rows: &[HabitSummary]) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "(no habits yet)")?;
        return Ok(());
    }
    for row in rows {
        let today = if row.done_today { "done today" } else { "not done" };
        writeln!(out, "- {} | streak: {} | {}", row.name, row.streak, today)?;
    }
    Ok(())
}

/// Write the seven-day report, oldest day first
pub fn write_weekly(out: &mut impl Write, rows: &[WeeklyRow]) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "(no habits)")?;
        return Ok(());
    }
    writeln!(out, "=== Weekly Report (last 7 days) ===")?;
    for row in rows {
        writeln!(out, "{} | streak: {}", row.name, row.streak)?;
        let marks: Vec<&str> = row
            .days
            .iter()
            .map(|d| if d.done { "✔" } else { "✘" })
            .collect();
        writeln!(out, "  {}", marks.join(" "))?;
    }
    Ok(())
}

/// Human-readable result of a store operation
pub fn describe_result<T>(result: &Result<T, StoreError>, success: &str) -> String {
    match result {
        Ok(_) => success.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Human-readable result of adding `name`
pub fn describe_add(name: &str, result: &Result<AddOutcome, StoreError>) -> String {
    let name = name.trim();
    match result {
        Ok(AddOutcome::Added) => format!("Added: {name}"),
        Ok(AddOutcome::AlreadyExists) => format!("Habit already exists: {name}"),
        Err(e) => e.to_string(),
    }
}

/// Run the menu loop until the user quits or input ends
pub fn run<R: BufRead, W: Write>(store: &mut HabitStore, input: &mut R, out: &mut W) -> Result<()> {
    loop {
        writeln!(out, "\n{MENU}")?;
        let Some(choice) = prompt(input, out, "> ")? else {
            return Ok(());
        };

        match choice.as_str() {
            "0" | "q" => return Ok(()),
            "1" => {
                let Some(name) = prompt(input, out, "Habit name: ")? else {
                    return Ok(());
                };
                let result = store.add_habit(&name);
                writeln!(out, "{}", describe_add(&name, &result))?;
            }
            "2" | "3" => {
                let Some(name) = prompt(input, out, "Habit name: ")? else {
                    return Ok(());
                };
                let done = choice == "2";
                let result = store.set_today(&name, done);
                let success = if done {
                    format!("Marked today complete: {name}")
                } else {
                    format!("Cleared today: {name}")
                };
                writeln!(out, "{}", describe_result(&result, &success))?;
            }
            "4" => write_list(out, &store.list())?,
            "5" => write_weekly(out, &store.weekly_report())?,
            "6" => {
                let Some(name) = prompt(input, out, "Habit name: ")? else {
                    return Ok(());
                };
                let result = store.remove_habit(&name);
                writeln!(out, "{}", describe_result(&result, &format!("Removed: {name}")))?;
            }
            "7" => {
                let Some(path) = prompt(input, out, "Snapshot path: ")? else {
                    return Ok(());
                };
                match store.save_snapshot(Path::new(&path)) {
                    Ok(()) => writeln!(out, "Saved to {path}")?,
                    Err(e) => writeln!(out, "Could not save {path}: {e}")?,
                }
            }
            "8" => {
                let Some(path) = prompt(input, out, "Snapshot path: ")? else {
                    return Ok(());
                };
                match store.load_snapshot(Path::new(&path)) {
                    Ok(n) => writeln!(out, "Loaded {n} habit(s) from {path}")?,
                    Err(e) => writeln!(out, "Could not load {path}: {e}")?,
                }
            }
            "" => {}
            other => writeln!(out, "Unknown choice {other:?}, pick 0-8")?,
        }
    }
}

/// Print `label` and read one trimmed line; `None` at end of input
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(store: &mut HabitStore, script: &str) -> String {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run(store, &mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_add_mark_and_list() {
        let mut store = HabitStore::new();
        let out = run_script(&mut store, "1\nRead\n2\nRead\n4\n0\n");

        assert!(out.contains("Added: Read"));
        assert!(out.contains("Marked today complete: Read"));
        assert!(out.contains("- Read | streak: 1 | done today"));
        assert_eq!(store.list()[0].streak, 1);
    }

    #[test]
    fn test_duplicate_and_unknown_are_messages() {
        let mut store = HabitStore::new();
        let out = run_script(&mut store, "1\nRead\n1\nRead\n2\nWalk\n9\n");

        assert!(out.contains("Habit already exists: Read"));
        assert!(out.contains("habit not found: Walk"));
        assert!(out.contains("Unknown choice \"9\""));
        assert_eq!(store.habits().len(), 1);
    }

    #[test]
    fn test_unmark_and_remove() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        store.add_habit("Walk").unwrap();
        store.mark_completed_today("Read").unwrap();

        let out = run_script(&mut store, "3\nRead\n6\nWalk\n4\n");
        assert!(out.contains("Cleared today: Read"));
        assert!(out.contains("Removed: Walk"));
        assert!(out.contains("- Read | streak: 0 | not done"));
        assert!(store.find("Walk").is_none());
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let path = path.to_str().unwrap();

        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        let out = run_script(&mut store, &format!("7\n{path}\n"));
        assert!(out.contains("Saved to"));

        let mut fresh = HabitStore::new();
        let out = run_script(&mut fresh, &format!("8\n{path}\n0\n"));
        assert!(out.contains("Loaded 1 habit(s)"));
        assert_eq!(fresh.habits(), store.habits());
    }

    #[test]
    fn test_empty_store_renderings() {
        let mut out = Vec::new();
        write_list(&mut out, &[]).unwrap();
        write_weekly(&mut out, &[]).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("(no habits yet)"));
        assert!(out.contains("(no habits)"));
    }

    #[test]
    fn test_weekly_rendering_has_seven_marks() {
        let mut store = HabitStore::new();
        store.add_habit("Read").unwrap();
        store.mark_completed_today("Read").unwrap();

        let mut out = Vec::new();
        write_weekly(&mut out, &store.weekly_report()).unwrap();
        let out = String::from_utf8(out).unwrap();

        let marks = out.lines().last().unwrap().trim();
        assert_eq!(marks, "✘ ✘ ✘ ✘ ✘ ✘ ✔");
    }

    #[test]
    fn test_describe_add_uses_stored_name() {
        let mut store = HabitStore::new();
        let result = store.add_habit(" Read ");
        assert_eq!(describe_add(" Read ", &result), "Added: Read");
    }
}
