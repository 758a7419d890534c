//! Command-line interface argument parsing for habit-tracker.
//!
//! - `habit-tracker` opens the full-screen dashboard
//! - `habit-tracker menu` runs the numbered text menu
//! - `habit-tracker add "Read"` / `done` / `undo` / `remove` change a habit
//! - `habit-tracker --backend json report` prints the weekly report

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "HABIT_TRACKER_DIR";

/// A terminal habit tracker with daily completions and streaks.
#[derive(Parser, Debug)]
#[command(name = "habit-tracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Where habits are persisted
    #[arg(long, value_enum, default_value_t = BackendKind::Sqlite, global = true)]
    pub backend: BackendKind,

    /// Directory holding the database, snapshot and logs.
    /// Defaults to $HABIT_TRACKER_DIR, then the platform data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level written to the log file (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Launch the full-screen dashboard (default)
    Tui,

    /// Run the numbered text menu
    Menu,

    /// Start tracking a new habit
    Add { name: String },

    /// Mark a habit done for today
    Done { name: String },

    /// Clear today's completion for a habit
    Undo { name: String },

    /// Stop tracking a habit and delete its history
    Remove { name: String },

    /// Show every habit with its streak
    List,

    /// Show the last seven days for every habit
    Report,

    /// Write all habits to a JSON snapshot
    Export { path: PathBuf },

    /// Replace all habits with a JSON snapshot
    Import { path: PathBuf },
}

/// Persistence backend selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// SQLite database (`habits.db`)
    Sqlite,
    /// JSON document (`habits.json`)
    Json,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Create AppConfig from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        Self::resolve(cli.backend, cli.data_dir.clone(), env_dir, cli.log_level.clone())
    }

    fn resolve(
        backend: BackendKind,
        data_dir: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        log_level: String,
    ) -> Self {
        let data_dir = data_dir
            .or(env_dir)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| {
                dirs::data_dir()
                    .map(|d| d.join("habit-tracker"))
                    .unwrap_or_else(|| PathBuf::from(".habit-tracker"))
            });

        AppConfig {
            backend,
            data_dir,
            log_level,
        }
    }

    /// File backing the selected backend
    pub fn backend_path(&self) -> PathBuf {
        match self.backend {
            BackendKind::Sqlite => self.data_dir.join("habits.db"),
            BackendKind::Json => self.data_dir.join("habits.json"),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Default target for snapshot exports from the dashboard
    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join("habits-export.json")
    }
}
