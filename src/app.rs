//! Full-screen dashboard and its event loop.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::cli::AppConfig;
use crate::data::{HabitStore, StoreError};
use crate::menu::{describe_add, describe_result};
use crate::ui::{
    widgets::{ConfirmDialog, HabitList, StatusBar, StatusContent, WeeklyTable},
    HelpOverlay, Theme,
};

/// How often the screen is redrawn when idle, so the date rolls over at midnight
const TICK_RATE: Duration = Duration::from_millis(250);

/// What keyboard input currently drives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing the name of a new habit
    Adding(String),
    /// Waiting for y/n before removing the named habit
    ConfirmRemove(String),
}

/// Last result shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Application state
pub struct App {
    config: AppConfig,
    theme: Theme,
    store: HabitStore,

    // UI state
    selected: usize,
    mode: Mode,
    show_help: bool,
    message: Option<StatusMessage>,

    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig, store: HabitStore) -> Self {
        App {
            config,
            theme: Theme::default(),
            store,
            selected: 0,
            mode: Mode::Normal,
            show_help: false,
            message: None,
            should_quit: false,
        }
    }

    fn selected_name(&self) -> Option<String> {
        self.store
            .habits()
            .get(self.selected)
            .map(|h| h.name().to_string())
    }

    fn clamp_selection(&mut self) {
        let len = self.store.habits().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn report<T>(&mut self, result: Result<T, StoreError>, success: String) {
        let is_error = result.is_err();
        self.message = Some(StatusMessage {
            text: describe_result(&result, &success),
            is_error,
        });
    }

    /// Handle a key press
    pub fn handle_input(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Adding(buffer) => self.handle_adding(key, buffer),
            Mode::ConfirmRemove(name) => self.handle_confirm(key, name),
            Mode::Normal => self.handle_normal(key),
        }
    }

    fn handle_adding(&mut self, key: KeyCode, mut buffer: String) {
        match key {
            KeyCode::Enter => {
                let name = buffer.trim().to_string();
                if name.is_empty() {
                    self.mode = Mode::Adding(buffer);
                    return;
                }
                let result = self.store.add_habit(&name);
                self.message = Some(StatusMessage {
                    text: describe_add(&name, &result),
                    is_error: result.is_err(),
                });
                if let Some(idx) = self.store.habits().iter().position(|h| h.name() == name) {
                    self.selected = idx;
                }
            }
            KeyCode::Esc => {}
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = Mode::Adding(buffer);
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.mode = Mode::Adding(buffer);
            }
            _ => self.mode = Mode::Adding(buffer),
        }
    }

    fn handle_confirm(&mut self, key: KeyCode, name: String) {
        if matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
            let result = self.store.remove_habit(&name);
            self.report(result, format!("Removed: {name}"));
            self.clamp_selection();
        }
    }

    fn handle_normal(&mut self, key: KeyCode) {
        if self.show_help {
            if matches!(
                key,
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        let len = self.store.habits().len();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            KeyCode::Char('a') => self.mode = Mode::Adding(String::new()),
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.selected = (self.selected + 1) % len;
            }
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                self.selected = self.selected.checked_sub(1).unwrap_or(len - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(name) = self.selected_name() {
                    let done = !self
                        .store
                        .find(&name)
                        .is_some_and(|h| h.is_completed_today());
                    let result = self.store.set_today(&name, done);
                    let verb = if done { "Done today" } else { "Cleared today" };
                    self.report(result, format!("{verb}: {name}"));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(name) = self.selected_name() {
                    self.mode = Mode::ConfirmRemove(name);
                }
            }
            KeyCode::Char('s') => {
                let path = self.config.export_path();
                self.message = Some(match self.store.save_snapshot(&path) {
                    Ok(()) => StatusMessage {
                        text: format!("Exported to {}", path.display()),
                        is_error: false,
                    },
                    Err(e) => StatusMessage {
                        text: format!("Export failed: {e}"),
                        is_error: true,
                    },
                });
            }
            KeyCode::Char('r') => {
                let result = self.store.load_from_backend();
                let text = match &result {
                    Ok(n) => format!("Reloaded {n} habit(s)"),
                    Err(_) => String::new(),
                };
                self.report(result, text);
                self.clamp_selection();
            }
            _ => {}
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let size = frame.area();

        // Main layout: body and status bar
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(size);

        // Body layout: habit list (left) and weekly table (right)
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[0]);

        let summaries = self.store.list();
        HabitList::new(&summaries, self.selected, &self.theme).render(frame, body_chunks[0]);

        let weekly = self.store.weekly_report();
        WeeklyTable::new(&weekly, self.selected, &self.theme).render(frame, body_chunks[1]);

        let backend = self.store.backend_name();
        let content = match &self.mode {
            Mode::Adding(buffer) => StatusContent::Input(buffer),
            _ => StatusContent::Hints {
                backend: backend.as_deref(),
                message: self
                    .message
                    .as_ref()
                    .map(|m| (m.text.as_str(), m.is_error)),
            },
        };
        StatusBar::new(content, &self.theme).render(frame, main_chunks[1]);

        if let Mode::ConfirmRemove(name) = &self.mode {
            ConfirmDialog::new(name, &self.theme).render(frame, size);
        }

        if self.show_help {
            HelpOverlay::new(&self.theme).render(frame, size);
        }
    }
}

/// Restore terminal to normal state
fn restore_terminal() {
    // Best effort cleanup - ignore errors since we may be in a panic
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the dashboard until the user quits
pub fn run(config: AppConfig, store: HabitStore) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        restore_terminal();
        return Err(e).context("Failed to setup terminal");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(t) => t,
        Err(e) => {
            restore_terminal();
            return Err(e).context("Failed to create terminal");
        }
    };

    let mut app = App::new(config, store);
    info!("event=tui_start habits={}", app.store.habits().len());

    let result = run_main_loop(&mut terminal, &mut app);

    // Always restore terminal, regardless of result
    restore_terminal();
    terminal.show_cursor().ok();

    info!("event=tui_stop status={}", if result.is_ok() { "ok" } else { "error" });
    result
}

/// Main application loop
fn run_main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_input(key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
