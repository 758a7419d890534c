//! UI widgets for the habit dashboard.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row,
        Table, TableState,
    },
    Frame,
};

use crate::data::{HabitSummary, WeeklyRow};

use super::help::centered_rect;
use super::theme::Theme;

/// Checkbox shown for a habit's state today
pub fn today_box(done: bool) -> &'static str {
    if done {
        "[✔]"
    } else {
        "[ ]"
    }
}

/// Mark shown for a single day in the weekly view
pub fn day_mark(done: bool) -> &'static str {
    if done {
        "✔"
    } else {
        "✘"
    }
}

fn panel<'a>(title: String, theme: &Theme, focused: bool) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Double
        } else {
            BorderType::Plain
        })
        .border_style(theme.border_style())
        .title_style(theme.title_style())
}

/// Habit list panel: today's checkbox, name and streak
pub struct HabitList<'a> {
    habits: &'a [HabitSummary],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> HabitList<'a> {
    pub fn new(habits: &'a [HabitSummary], selected: usize, theme: &'a Theme) -> Self {
        HabitList {
            habits,
            selected,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel(format!(" Habits ({}) ", self.habits.len()), self.theme, true);

        if self.habits.is_empty() {
            let hint = Paragraph::new("No habits yet. Press [a] to add one.")
                .block(block)
                .style(self.theme.surface_style());
            frame.render_widget(hint, area);
            return;
        }

        let items: Vec<ListItem> = self
            .habits
            .iter()
            .map(|h| {
                ListItem::new(Line::from(vec![
                    Span::styled(today_box(h.done_today), self.theme.day_style(h.done_today)),
                    Span::raw(format!(" {}", h.name)),
                    Span::styled(
                        format!("  (streak: {})", h.streak),
                        Style::default().fg(self.theme.title),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(self.theme.highlight_style())
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// Seven-day table for every habit, oldest day on the left
pub struct WeeklyTable<'a> {
    rows: &'a [WeeklyRow],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> WeeklyTable<'a> {
    pub fn new(rows: &'a [WeeklyRow], selected: usize, theme: &'a Theme) -> Self {
        WeeklyTable {
            rows,
            selected,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel(" Weekly (last 7 days) ".to_string(), self.theme, false);

        let Some(first) = self.rows.first() else {
            let empty = Paragraph::new("No habits")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        };

        let mut header = vec![Cell::from("Habit"), Cell::from("Streak")];
        header.extend(
            first
                .days
                .iter()
                .map(|d| Cell::from(d.date.format("%a").to_string())),
        );

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![Cell::from(r.name.clone()), Cell::from(r.streak.to_string())];
                cells.extend(
                    r.days
                        .iter()
                        .map(|d| Cell::from(day_mark(d.done)).style(self.theme.day_style(d.done))),
                );
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Min(12), Constraint::Length(7)];
        widths.extend(first.days.iter().map(|_| Constraint::Length(4)));

        let table = Table::new(rows, widths)
            .header(Row::new(header).style(self.theme.title_style()))
            .block(block)
            .row_highlight_style(self.theme.highlight_style());

        let mut state = TableState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }
}

/// Where changes go, as shown in the status bar
pub fn backend_label(backend: Option<&str>) -> &str {
    backend.unwrap_or("memory only, changes are not saved")
}

/// What the bottom bar is showing
pub enum StatusContent<'a> {
    /// Key hints, optionally preceded by the last result message
    Hints {
        backend: Option<&'a str>,
        message: Option<(&'a str, bool)>,
    },
    /// New-habit name being typed
    Input(&'a str),
}

/// Status bar widget
pub struct StatusBar<'a> {
    content: StatusContent<'a>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(content: StatusContent<'a>, theme: &'a Theme) -> Self {
        StatusBar { content, theme }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.content {
            StatusContent::Hints { backend, message } => {
                let mut spans = Vec::new();
                if let Some((text, is_error)) = message {
                    spans.push(Span::styled(
                        format!("{text}  "),
                        self.theme.message_style(*is_error),
                    ));
                }
                spans.push(Span::raw(
                    "↑/↓ move | Space toggle | a add | d remove | s export | h help | q quit",
                ));
                spans.push(Span::styled(
                    format!("  [{}]", backend_label(*backend)),
                    self.theme.border_style(),
                ));
                Line::from(spans)
            }
            StatusContent::Input(buffer) => Line::from(vec![
                Span::styled("New habit: ", self.theme.title_style()),
                Span::raw(format!("{buffer}█")),
                Span::styled("  (Enter add, Esc cancel)", self.theme.border_style()),
            ]),
        };

        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
        frame.render_widget(paragraph, area);
    }
}

/// Centered popup used while confirming a removal
pub struct ConfirmDialog<'a> {
    name: &'a str,
    theme: &'a Theme,
}

impl<'a> ConfirmDialog<'a> {
    pub fn new(name: &'a str, theme: &'a Theme) -> Self {
        ConfirmDialog { name, theme }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(40, 20, area);
        frame.render_widget(Clear, popup);

        let text = vec![
            Line::from(""),
            Line::from(format!("Remove \"{}\"?", self.name)),
            Line::from("Its completion history will be deleted."),
            Line::from(""),
            Line::from(Span::styled("[y] yes   [n] no", self.theme.title_style())),
        ];
        let dialog = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(panel(" Confirm ".to_string(), self.theme, true))
            .style(self.theme.surface_style());
        frame.render_widget(dialog, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(today_box(true), "[✔]");
        assert_eq!(today_box(false), "[ ]");
        assert_eq!(day_mark(true), "✔");
        assert_eq!(day_mark(false), "✘");
    }

    #[test]
    fn test_backend_label_flags_memory_only() {
        assert_eq!(backend_label(Some("sqlite:/tmp/habits.db")), "sqlite:/tmp/habits.db");
        assert!(backend_label(None).contains("not saved"));
    }
}
