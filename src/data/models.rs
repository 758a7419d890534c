//! Data models for tracked habits and the views derived from them.

use std::collections::BTreeSet;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only date format accepted anywhere: `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of days covered by the weekly report
pub const WEEK_DAYS: usize = 7;

/// Today's date on the host's local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` string.
///
/// chrono accepts unpadded fields like `2025-1-5`, so the length is checked
/// first to reject anything that isn't exactly ten characters.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// A tracked habit and the days it was completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "HabitRecord", try_from = "HabitRecord")]
pub struct Habit {
    name: String,
    completed: BTreeSet<NaiveDate>,
}

impl Habit {
    pub fn new(name: impl Into<String>) -> Self {
        Habit {
            name: name.into(),
            completed: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark today as completed. Marking twice is a no-op.
    #[allow(dead_code)] // Used in tests
    pub fn mark_completed_today(&mut self) {
        self.mark_completed_on(today());
    }

    /// Remove today's completion, if any.
    #[allow(dead_code)] // Used in tests
    pub fn unmark_today(&mut self) {
        self.unmark_on(today());
    }

    pub fn mark_completed_on(&mut self, date: NaiveDate) {
        self.completed.insert(date);
    }

    pub fn unmark_on(&mut self, date: NaiveDate) {
        self.completed.remove(&date);
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed.contains(&date)
    }

    pub fn is_completed_today(&self) -> bool {
        self.is_completed_on(today())
    }

    /// Completion dates, most recent first
    pub fn completed_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.completed.iter().rev().copied()
    }

    pub fn completion_count(&self) -> usize {
        self.completed.len()
    }

    /// Consecutive completed days ending today
    #[allow(dead_code)] // Used in tests
    pub fn current_streak(&self) -> u32 {
        self.streak_ending(today())
    }

    /// Consecutive completed days walking backward from `day`.
    ///
    /// Returns 0 when `day` itself is not completed.
    pub fn streak_ending(&self, day: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut cursor = Some(day);
        while let Some(date) = cursor.filter(|d| self.is_completed_on(*d)) {
            streak += 1;
            cursor = date.pred_opt();
        }
        streak
    }

    /// Completion markers for the seven days ending at `day`, oldest first
    pub fn week_ending(&self, day: NaiveDate) -> Vec<DayMark> {
        (0..WEEK_DAYS as i64)
            .rev()
            .map(|back| {
                let date = day - Duration::days(back);
                DayMark {
                    date,
                    done: self.is_completed_on(date),
                }
            })
            .collect()
    }
}

/// Errors raised when a persisted record cannot become a [`Habit`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HabitRecordError {
    #[error("habit name is empty")]
    EmptyName,

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// On-disk shape of a habit in the JSON snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitRecord {
    pub name: String,
    #[serde(default)]
    pub dates: Vec<String>,
}

impl From<Habit> for HabitRecord {
    fn from(habit: Habit) -> Self {
        HabitRecord {
            dates: habit.completed.iter().copied().map(format_date).collect(),
            name: habit.name,
        }
    }
}

impl TryFrom<HabitRecord> for Habit {
    type Error = HabitRecordError;

    fn try_from(record: HabitRecord) -> Result<Self, Self::Error> {
        if record.name.trim().is_empty() {
            return Err(HabitRecordError::EmptyName);
        }
        let mut habit = Habit::new(record.name);
        for raw in record.dates {
            let date = parse_date(&raw).ok_or(HabitRecordError::InvalidDate(raw))?;
            habit.mark_completed_on(date);
        }
        Ok(habit)
    }
}

/// One row of the habit listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitSummary {
    pub name: String,
    pub streak: u32,
    pub done_today: bool,
}

/// Completion state of a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMark {
    pub date: NaiveDate,
    pub done: bool,
}

/// A habit's streak and its last seven days
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRow {
    pub name: String,
    pub streak: u32,
    pub days: Vec<DayMark>,
}
