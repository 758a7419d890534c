//! Terminal User Interface components for habit-tracker.

mod help;
mod theme;
pub mod widgets;

pub use help::HelpOverlay;
pub use theme::Theme;
