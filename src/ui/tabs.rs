//! Top-level tabs and the tab bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Stats and sync status.
    #[default]
    Dashboard,
    /// Documentation pages.
    Docs,
    /// Packages.
    Packages,
    /// Issues.
    Issues,
    /// Combined search.
    Search,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Docs,
        Tab::Packages,
        Tab::Issues,
        Tab::Search,
    ];

    /// Returns the display title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Docs => "Docs",
            Tab::Packages => "Packages",
            Tab::Issues => "Issues",
            Tab::Search => "Search",
        }
    }

    /// Returns the zero-based position.
    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Returns the tab for a 1-based digit key.
    #[must_use]
    pub fn from_digit(digit: char) -> Option<Self> {
        let n = digit.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Returns the next tab, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Returns the previous tab, wrapping around.
    #[must_use]
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Tab bar widget.
pub struct TabBar {
    active: Tab,
    busy: bool,
}

impl TabBar {
    /// Creates a tab bar highlighting `active`.
    #[must_use]
    pub fn new(active: Tab) -> Self {
        Self {
            active,
            busy: false,
        }
    }

    /// Shows a busy marker when any request is in flight.
    #[must_use]
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let mut spans = vec![Span::styled(
            " FlutterLens ",
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )];

        for (i, tab) in Tab::ALL.iter().enumerate() {
            let style = if *tab == self.active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("{} {}", i + 1, tab.title()), style));
        }

        if self.busy {
            spans.push(Span::styled("  ⟳", Style::default().fg(Color::Yellow)));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(Color::Rgb(30, 30, 40)))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_digit() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Dashboard));
        assert_eq!(Tab::from_digit('5'), Some(Tab::Search));
        assert_eq!(Tab::from_digit('0'), None);
        assert_eq!(Tab::from_digit('6'), None);
        assert_eq!(Tab::from_digit('x'), None);
    }

    #[test]
    fn test_next_previous_wrap() {
        assert_eq!(Tab::Search.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.previous(), Tab::Search);
        assert_eq!(Tab::Docs.next(), Tab::Packages);
    }

    #[test]
    fn test_render_titles() {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        TabBar::new(Tab::Docs).render(area, &mut buf);

        let line: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(line.contains("FlutterLens"));
        assert!(line.contains("2 Docs"));
        assert!(line.contains("5 Search"));
    }
}
