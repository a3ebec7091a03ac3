//! Search tab: query line, recent searches and grouped results.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::format::{format_date, truncate_or_placeholder};
use crate::api::{Resource, SearchResponse};

/// Width of result snippets.
const SNIPPET_WIDTH: usize = 150;

/// Search tab widget.
pub struct SearchView<'a> {
    query: &'a str,
    editing: bool,
    results: Option<&'a SearchResponse>,
    history: &'a [String],
    loading: bool,
    scroll: u16,
}

impl<'a> SearchView<'a> {
    /// Creates the search view for the current query text.
    #[must_use]
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            editing: false,
            results: None,
            history: &[],
            loading: false,
            scroll: 0,
        }
    }

    /// Marks the query line as being edited.
    #[must_use]
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Sets the last search response.
    #[must_use]
    pub fn results(mut self, results: Option<&'a SearchResponse>) -> Self {
        self.results = results;
        self
    }

    /// Sets recent queries, newest first.
    #[must_use]
    pub fn history(mut self, history: &'a [String]) -> Self {
        self.history = history;
        self
    }

    /// Marks a search as in flight.
    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Scrolls the result list by `scroll` lines.
    #[must_use]
    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for SearchView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Query
                Constraint::Length(1), // History
                Constraint::Min(3),    // Results
            ])
            .split(area);

        self.render_query(chunks[0], buf);
        self.render_history(chunks[1], buf);
        self.render_results(chunks[2], buf);
    }
}

impl SearchView<'_> {
    fn render_query(&self, area: Rect, buf: &mut Buffer) {
        let border = if self.editing {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let mut spans = vec![Span::raw(self.query)];
        if self.editing {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        } else if self.query.is_empty() {
            spans.push(Span::styled(
                "press / to search docs, packages and issues",
                Style::default().fg(Color::DarkGray),
            ));
        }
        Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .title(" Search ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .render(area, buf);
    }

    fn render_history(&self, area: Rect, buf: &mut Buffer) {
        if self.history.is_empty() {
            return;
        }
        let mut spans = vec![Span::styled(
            " Recent: ",
            Style::default().fg(Color::Gray),
        )];
        for (i, query) in self.history.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(query.as_str(), Style::default().fg(Color::Cyan)));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let block = |title: String| {
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
        };

        let centered = |text: String| {
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
        };

        if self.loading {
            centered("Searching...".to_string())
                .block(block(" Results ".to_string()))
                .render(area, buf);
            return;
        }

        let Some(response) = self.results else {
            centered("Enter a search term to find documentation, packages, and issues".to_string())
                .block(block(" Results ".to_string()))
                .render(area, buf);
            return;
        };

        if response.is_empty() {
            centered(format!("No results found for \"{}\"", response.query))
                .block(block(" Results ".to_string()))
                .render(area, buf);
            return;
        }

        let block = block(format!(
            " Results: {} for \"{}\" ",
            response.total_results, response.query
        ));
        let results = &response.results;
        let mut lines = Vec::new();
        push_group(&mut lines, "Documentation", Color::Blue, &results.docs);
        push_group(&mut lines, "Packages", Color::Green, &results.packages);
        push_group(&mut lines, "Issues", Color::Magenta, &results.issues);

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}

fn push_group<T: Resource>(lines: &mut Vec<Line<'static>>, title: &str, color: Color, items: &[T]) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        format!("{} ({})", title, items.len()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    for item in items {
        lines.push(Line::from(vec![
            Span::styled("  ▸ ", Style::default().fg(color)),
            Span::styled(
                item.heading().unwrap_or("Untitled").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", format_date(item.timestamp())),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", truncate_or_placeholder(item.blurb(), SNIPPET_WIDTH)),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::raw(""));
}
