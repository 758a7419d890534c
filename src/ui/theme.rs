//! Theme configuration for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub border: Color,
    pub title: Color,
    pub done: Color,
    pub missed: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            bg: Color::Reset,
            fg: Color::White,
            highlight_bg: Color::Rgb(60, 60, 80),
            highlight_fg: Color::White,
            border: Color::Rgb(100, 100, 120),
            title: Color::Cyan,
            // Named colors for better terminal compatibility
            done: Color::Green,
            missed: Color::DarkGray,
            error: Color::Red,
        }
    }
}

impl Theme {
    /// Base surface style used to paint widget backgrounds
    pub fn surface_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Get style for titles
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.title)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a day cell depending on whether it was completed
    pub fn day_style(&self, done: bool) -> Style {
        if done {
            Style::default().fg(self.done).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.missed)
        }
    }

    /// Style for status messages
    pub fn message_style(&self, is_error: bool) -> Style {
        if is_error {
            Style::default().fg(self.error).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.done)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_done_and_missed_are_distinct() {
        let theme = Theme::default();
        assert_ne!(theme.day_style(true), theme.day_style(false));
        assert_ne!(theme.done, theme.missed);
    }

    #[test]
    fn test_error_messages_stand_out() {
        let theme = Theme::default();
        assert_eq!(theme.message_style(true).fg, Some(theme.error));
        assert_ne!(theme.message_style(true), theme.message_style(false));
    }
}
