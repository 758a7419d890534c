//! habit-tracker: a terminal habit tracker.
//!
//! Records which days each habit was completed, derives the current streak
//! and shows it through a full-screen dashboard, a text menu or one-shot
//! subcommands. Habits persist to SQLite or a JSON document.

mod app;
mod cli;
mod data;
mod logging;
mod menu;
mod ui;

use std::io;

use anyhow::Result;
use cli::{AppConfig, BackendKind, Cli, Commands};
use data::{Backend, DocumentBackend, HabitStore, SqliteBackend, StorageError};
use log::{info, warn};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();
    let config = AppConfig::from_cli(&cli);

    // Keep the handle alive until exit so buffered lines get flushed
    let _logger = match logging::init_logging(&config.log_level, &config.log_dir()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    let store = open_store(&config);
    let command = cli.command.unwrap_or(Commands::Tui);
    run_command(command, config, store)
}

fn open_backend(config: &AppConfig) -> Result<Box<dyn Backend>, StorageError> {
    let path = config.backend_path();
    let backend: Box<dyn Backend> = match config.backend {
        BackendKind::Sqlite => Box::new(SqliteBackend::open(&path)?),
        BackendKind::Json => Box::new(DocumentBackend::new(path)),
    };
    Ok(backend)
}

/// Open the configured backend and load it; fall back to memory on failure
fn open_store(config: &AppConfig) -> HabitStore {
    let backend = match open_backend(config) {
        Ok(backend) => backend,
        Err(e) => {
            warn!("event=backend_open status=error fallback=memory error={e}");
            eprintln!("warning: {e}; changes will not be saved");
            return HabitStore::new();
        }
    };

    let mut store = HabitStore::with_backend(backend);
    match store.load_or_detach() {
        Ok(n) => info!("event=startup_load status=ok habits={n}"),
        Err(e) => {
            warn!("event=startup_load status=error fallback=memory error={e}");
            eprintln!("warning: {e}; running in memory, changes will not be saved");
        }
    }
    store
}

fn run_command(command: Commands, config: AppConfig, mut store: HabitStore) -> Result<()> {
    let mut out = io::stdout().lock();
    match command {
        Commands::Tui => {
            drop(out);
            app::run(config, store)?;
        }
        Commands::Menu => {
            menu::run(&mut store, &mut io::stdin().lock(), &mut out)?;
        }
        Commands::Add { name } => {
            let result = store.add_habit(&name);
            print_line(&mut out, menu::describe_add(&name, &result))?;
        }
        Commands::Done { name } => {
            let result = store.mark_completed_today(&name);
            let text = menu::describe_result(&result, &format!("Marked today complete: {name}"));
            print_line(&mut out, text)?;
        }
        Commands::Undo { name } => {
            let result = store.set_today(&name, false);
            let text = menu::describe_result(&result, &format!("Cleared today: {name}"));
            print_line(&mut out, text)?;
        }
        Commands::Remove { name } => {
            let result = store.remove_habit(&name);
            let text = menu::describe_result(&result, &format!("Removed: {name}"));
            print_line(&mut out, text)?;
        }
        Commands::List => menu::write_list(&mut out, &store.list())?,
        Commands::Report => menu::write_weekly(&mut out, &store.weekly_report())?,
        Commands::Export { path } => match store.save_snapshot(&path) {
            Ok(()) => print_line(&mut out, format!("Saved to {}", path.display()))?,
            Err(e) => print_line(&mut out, format!("Could not save {}: {e}", path.display()))?,
        },
        Commands::Import { path } => match store.load_snapshot(&path) {
            Ok(n) => print_line(
                &mut out,
                format!("Loaded {n} habit(s) from {}", path.display()),
            )?,
            Err(e) => print_line(&mut out, format!("Could not load {}: {e}", path.display()))?,
        },
    }
    Ok(())
}

fn print_line(out: &mut impl io::Write, text: String) -> Result<()> {
    writeln!(out, "{text}")?;
    Ok(())
}
