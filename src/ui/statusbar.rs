//! Status bar widget.
//!
//! Renders the error slot, in-flight requests and key hints.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::store::{LoadingFlags, LoadingKey};

/// Separator character for status bar segments.
const SEG_SEPARATOR: char = '\u{2502}';

const NORMAL_HINTS: &str = "1-5 tabs  / filter  n more  r refresh  s sync  h health  e clear  q quit";
const EDIT_HINTS: &str = "Enter submit  Esc cancel";

/// Status bar widget.
pub struct StatusBar<'a> {
    /// Error from the last failed operation.
    error: Option<&'a str>,
    /// Informational message.
    message: &'a str,
    /// In-flight requests.
    loading: LoadingFlags,
    /// Whether a text field is being edited.
    editing: bool,
}

impl<'a> StatusBar<'a> {
    /// Creates a new status bar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            error: None,
            message: "",
            loading: LoadingFlags::default(),
            editing: false,
        }
    }

    /// Sets the error text.
    #[must_use]
    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Sets the status message.
    #[must_use]
    pub fn message(mut self, message: &'a str) -> Self {
        self.message = message;
        self
    }

    /// Sets the loading flags.
    #[must_use]
    pub fn loading(mut self, loading: LoadingFlags) -> Self {
        self.loading = loading;
        self
    }

    /// Sets whether input is being edited.
    #[must_use]
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Returns the left segment text and its style.
    fn left_segment(&self) -> (String, Style) {
        if let Some(error) = self.error {
            return (
                format!(" ✗ {} ", error),
                Style::default().bg(Color::Red).fg(Color::White),
            );
        }

        let busy: Vec<&str> = LoadingKey::ALL
            .into_iter()
            .filter(|key| self.loading.get(*key))
            .map(|key| key.as_str())
            .collect();
        if !busy.is_empty() {
            return (
                format!(" ⟳ loading {} ", busy.join(", ")),
                Style::default().bg(Color::Yellow).fg(Color::Black),
            );
        }

        if self.message.is_empty() {
            (" ready ".to_string(), Style::default().bg(Color::Blue).fg(Color::White))
        } else {
            (
                format!(" {} ", self.message),
                Style::default().bg(Color::Blue).fg(Color::White),
            )
        }
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let bg_style = Style::default().bg(Color::Rgb(30, 30, 40)).fg(Color::White);
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_style(bg_style);
            }
        }

        let (left, left_style) = self.left_segment();
        let mut x = area.x;
        let right_edge = area.x + area.width;
        for c in left.chars() {
            if x >= right_edge {
                return;
            }
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(c);
                cell.set_style(left_style);
            }
            x += 1;
        }

        let hints = if self.editing {
            EDIT_HINTS
        } else {
            NORMAL_HINTS
        };
        let right = format!(" {} {}", SEG_SEPARATOR, hints);
        let hint_style = Style::default().bg(Color::Rgb(30, 30, 40)).fg(Color::DarkGray);
        for c in right.chars() {
            if x >= right_edge {
                break;
            }
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(c);
                cell.set_style(hint_style);
            }
            x += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_line(bar: StatusBar<'_>) -> String {
        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_error_takes_precedence() {
        let mut loading = LoadingFlags::default();
        loading.set(LoadingKey::Docs, true);
        let line = render_line(
            StatusBar::new()
                .error(Some("Too many requests. Please try again later."))
                .loading(loading),
        );
        assert!(line.contains("Too many requests"));
        assert!(!line.contains("loading docs"));
    }

    #[test]
    fn test_loading_keys_listed() {
        let mut loading = LoadingFlags::default();
        loading.set(LoadingKey::Docs, true);
        loading.set(LoadingKey::Stats, true);
        let line = render_line(StatusBar::new().loading(loading));
        assert!(line.contains("loading docs, stats"));
    }

    #[test]
    fn test_hints_follow_mode() {
        assert!(render_line(StatusBar::new()).contains("q quit"));
        assert!(render_line(StatusBar::new().editing(true)).contains("Esc cancel"));
    }

    #[test]
    fn test_zero_area_is_noop() {
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBar::new().render(area, &mut buf);
    }
}
