//! Collection tables for the docs, packages and issues tabs.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};

use super::format::{
    format_date, format_labels, format_popularity, truncate, truncate_or_placeholder,
};
use crate::api::{Doc, Issue, Package, Resource};

/// Width reserved for the blurb column when the area is unknown.
const DEFAULT_BLURB_WIDTH: usize = 60;

/// A resource that renders as one table row.
pub trait TableRow: Resource {
    /// Plural noun for titles and empty states.
    const NOUN: &'static str;

    /// Column headers.
    fn header() -> &'static [&'static str];

    /// Column widths, matching [`TableRow::header`].
    fn widths() -> Vec<Constraint>;

    /// Cell texts. `blurb_width` bounds the long-text column.
    fn cells(&self, blurb_width: usize) -> Vec<String>;
}

impl TableRow for Doc {
    const NOUN: &'static str = "docs";

    fn header() -> &'static [&'static str] {
        &["Title", "Category", "Summary", "Updated"]
    }

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Percentage(28),
            Constraint::Length(14),
            Constraint::Fill(1),
            Constraint::Length(10),
        ]
    }

    fn cells(&self, blurb_width: usize) -> Vec<String> {
        vec![
            self.heading().unwrap_or("Untitled").to_string(),
            self.category.clone().unwrap_or_default(),
            // Docs show the full content first, like the web table.
            truncate_or_placeholder(
                self.content.as_deref().or(self.summary.as_deref()),
                blurb_width,
            ),
            format_date(self.timestamp()),
        ]
    }
}

impl TableRow for Package {
    const NOUN: &'static str = "packages";

    fn header() -> &'static [&'static str] {
        &["Name", "Version", "Description", "Likes", "Pop.", "Points"]
    }

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Percentage(20),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(7),
        ]
    }

    fn cells(&self, blurb_width: usize) -> Vec<String> {
        let scores = self.scores();
        vec![
            self.heading().unwrap_or("unnamed").to_string(),
            self.version.clone().unwrap_or_default(),
            truncate_or_placeholder(self.blurb(), blurb_width),
            scores.likes.unwrap_or(0).to_string(),
            format_popularity(scores.popularity),
            format!("{} pts", scores.pub_points.unwrap_or(0)),
        ]
    }
}

impl TableRow for Issue {
    const NOUN: &'static str = "issues";

    fn header() -> &'static [&'static str] {
        &["#", "Title", "State", "Labels", "Updated"]
    }

    fn widths() -> Vec<Constraint> {
        vec![
            Constraint::Length(7),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Percentage(25),
            Constraint::Length(10),
        ]
    }

    fn cells(&self, blurb_width: usize) -> Vec<String> {
        vec![
            self.issue_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            truncate(self.heading().unwrap_or("Untitled"), blurb_width),
            self.state.clone().unwrap_or_default(),
            format_labels(&self.labels),
            format_date(self.timestamp()),
        ]
    }
}

/// Table widget over one collection.
pub struct ResourceTable<'a, T> {
    items: &'a [T],
    filter: &'a str,
    scroll: usize,
    loading: bool,
    has_more: bool,
    focused: bool,
}

impl<'a, T: TableRow> ResourceTable<'a, T> {
    /// Creates a table over `items`.
    #[must_use]
    pub fn new(items: &'a [T]) -> Self {
        Self {
            items,
            filter: "",
            scroll: 0,
            loading: false,
            has_more: false,
            focused: true,
        }
    }

    /// Hides rows whose heading and blurb don't contain `filter`.
    #[must_use]
    pub fn filter(mut self, filter: &'a str) -> Self {
        self.filter = filter;
        self
    }

    /// Skips the first `scroll` visible rows.
    #[must_use]
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Marks the collection as loading.
    #[must_use]
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Shows the load-more hint.
    #[must_use]
    pub fn has_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    /// Sets the focused state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Returns the rows that pass the filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&'a T> {
        self.items
            .iter()
            .filter(|item| item.matches(self.filter))
            .collect()
    }
}

impl<T: TableRow> Widget for ResourceTable<'_, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = self.visible();

        let mut title = format!(" {} ({}", capitalize(T::NOUN), visible.len());
        if visible.len() != self.items.len() {
            title.push_str(&format!(" of {}", self.items.len()));
        }
        title.push_str(") ");
        if self.loading {
            title.push_str("loading... ");
        }

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);
        if self.has_more {
            block = block.title_bottom(
                Line::from(" n: load more ")
                    .alignment(Alignment::Right)
                    .style(Style::default().fg(Color::DarkGray)),
            );
        }

        if visible.is_empty() {
            let message = if self.loading {
                format!("Loading {}...", T::NOUN)
            } else if self.items.is_empty() {
                format!("No {} found", T::NOUN)
            } else {
                format!("No {} match \"{}\"", T::NOUN, self.filter.trim())
            };
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(block)
                .render(area, buf);
            return;
        }

        let blurb_width = blurb_width_for(area.width);
        let rows = visible
            .iter()
            .skip(self.scroll.min(visible.len().saturating_sub(1)))
            .map(|item| Row::new(item.cells(blurb_width)));

        let header = Row::new(T::header().iter().copied()).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        Table::new(rows, T::widths())
            .header(header)
            .column_spacing(1)
            .block(block)
            .render(area, buf);
    }
}

fn blurb_width_for(area_width: u16) -> usize {
    if area_width == 0 {
        return DEFAULT_BLURB_WIDTH;
    }
    // Roughly half the row, the rest is fixed-width columns.
    (usize::from(area_width) / 2).max(10)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, content: &str) -> Doc {
        Doc {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Doc::default()
        }
    }

    fn render_text<T: TableRow>(table: ResourceTable<'_, T>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        table.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let docs = vec![
            doc("Layouts", "Row and Column"),
            doc("State", "setState basics"),
            doc("Animations", "implicit animations"),
        ];
        let table = ResourceTable::new(&docs).filter("COLUMN");
        let visible = table.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title.as_deref(), Some("Layouts"));
    }

    #[test]
    fn test_render_shows_filtered_count() {
        let docs = vec![doc("Layouts", "Row"), doc("State", "setState")];
        let text = render_text(ResourceTable::new(&docs).filter("state"), 80, 6);
        assert!(text.contains("Docs (1 of 2)"));
        assert!(text.contains("State"));
        assert!(!text.contains("Layouts"));
    }

    #[test]
    fn test_render_empty_states() {
        let docs: Vec<Doc> = Vec::new();
        let text = render_text(ResourceTable::new(&docs), 60, 5);
        assert!(text.contains("No docs found"));

        let text = render_text(ResourceTable::new(&docs).loading(true), 60, 5);
        assert!(text.contains("Loading docs..."));
    }

    #[test]
    fn test_issue_cells_collapse_labels() {
        let issue = Issue {
            issue_number: Some(4242),
            title: Some("Crash on start".to_string()),
            state: Some("open".to_string()),
            labels: vec!["a", "b", "c", "d"].into_iter().map(String::from).collect(),
            ..Issue::default()
        };
        let cells = issue.cells(40);
        assert_eq!(cells[0], "4242");
        assert_eq!(cells[3], "a, b, c +1");
    }

    #[test]
    fn test_package_cells_use_scores() {
        let package: Package = serde_json::from_value(serde_json::json!({
            "name": "provider",
            "version": "6.1.2",
            "description": "State management",
            "raw": {"likes": 10000, "popularity": 0.99, "pubPoints": 140}
        }))
        .expect("valid package");

        let cells = package.cells(40);
        assert_eq!(cells[0], "provider");
        assert_eq!(cells[3], "10000");
        assert_eq!(cells[4], "99%");
        assert_eq!(cells[5], "140 pts");
    }

    #[test]
    fn test_load_more_hint() {
        let docs = vec![doc("Layouts", "Row")];
        let text = render_text(ResourceTable::new(&docs).has_more(true), 60, 5);
        assert!(text.contains("n: load more"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("docs"), "Docs");
        assert_eq!(capitalize(""), "");
    }
}
