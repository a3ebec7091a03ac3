//! Screen layout: tab bar, optional filter line, body and status bar.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Height of the filter line, borders included.
const FILTER_HEIGHT: u16 = 3;

/// Calculated areas for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutAreas {
    /// Tab bar (one line).
    pub tab_bar: Rect,
    /// Filter input for table tabs.
    pub filter: Option<Rect>,
    /// Main content.
    pub body: Rect,
    /// Status bar (one line).
    pub status_bar: Rect,
}

impl LayoutAreas {
    /// Splits `area`; `with_filter` reserves the filter line.
    #[must_use]
    pub fn compute(area: Rect, with_filter: bool) -> Self {
        let filter_height = if with_filter { FILTER_HEIGHT } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(filter_height),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            tab_bar: chunks[0],
            filter: with_filter.then_some(chunks[1]),
            body: chunks[2],
            status_bar: chunks[3],
        }
    }
}

/// Filter input line above a table.
pub struct FilterBar<'a> {
    label: &'a str,
    text: &'a str,
    editing: bool,
}

impl<'a> FilterBar<'a> {
    /// Creates a filter bar titled `label` showing `text`.
    #[must_use]
    pub fn new(label: &'a str, text: &'a str) -> Self {
        Self {
            label,
            text,
            editing: false,
        }
    }

    /// Sets whether the text is being edited.
    #[must_use]
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.editing {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let mut spans = vec![Span::raw(self.text)];
        if self.editing {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        } else if self.text.is_empty() {
            spans.push(Span::styled(
                "press / to filter",
                Style::default().fg(Color::DarkGray),
            ));
        }

        Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .title(format!(" {} ", self.label))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .render(area, buf);
    }
}
