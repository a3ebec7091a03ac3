//! Dashboard tab: stat cards and sync status.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::format::{format_count, format_last_sync};
use crate::api::Health;
use crate::store::{LoadingKey, State};

/// API health as last observed by the dashboard.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HealthStatus {
    /// No check has run yet.
    #[default]
    Unknown,
    /// A check is in flight.
    Checking,
    /// The last check succeeded.
    Healthy(Health),
    /// The last check failed.
    Down(String),
}

impl HealthStatus {
    /// Returns the indicator label and color.
    #[must_use]
    pub fn indicator(&self) -> (String, Color) {
        match self {
            HealthStatus::Unknown => ("Unknown".to_string(), Color::Yellow),
            HealthStatus::Checking => ("Checking...".to_string(), Color::Yellow),
            HealthStatus::Healthy(health) => {
                let color = if health.is_ok() {
                    Color::Green
                } else {
                    Color::Yellow
                };
                let label = match &health.version {
                    Some(v) => format!("{} (v{})", health.status, v),
                    None => health.status.clone(),
                };
                (label, color)
            }
            HealthStatus::Down(message) => (message.clone(), Color::Red),
        }
    }
}

/// Dashboard tab widget.
pub struct DashboardView<'a> {
    state: &'a State,
    health: &'a HealthStatus,
}

impl<'a> DashboardView<'a> {
    /// Creates the dashboard view.
    #[must_use]
    pub fn new(state: &'a State, health: &'a HealthStatus) -> Self {
        Self { state, health }
    }
}

impl Widget for DashboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Cards
                Constraint::Min(6),    // Sync status
            ])
            .split(area);

        render_cards(self.state, chunks[0], buf);
        render_sync_status(self.state, self.health, chunks[1], buf);
    }
}

fn render_cards(state: &State, area: Rect, buf: &mut Buffer) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let stats_loading = state.is_loading(LoadingKey::Stats);
    let count = |n: u64| {
        if stats_loading {
            "...".to_string()
        } else {
            format_count(n)
        }
    };

    let cards = [
        ("Documentation", count(state.stats.total_docs), Color::Blue),
        ("Packages", count(state.stats.total_packages), Color::Green),
        ("Issues", count(state.stats.total_issues), Color::Magenta),
        ("Last Sync", format_last_sync(state.last_sync), Color::Cyan),
    ];

    for ((title, value, color), col) in cards.into_iter().zip(columns.iter()) {
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(block)
        .render(*col, buf);
    }
}

fn render_sync_status(state: &State, health: &HealthStatus, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title("Sync Status")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let (health_label, health_color) = health.indicator();
    let sync_label = if state.is_loading(LoadingKey::Sync) {
        Span::styled("Syncing...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("Idle", Style::default().fg(Color::Gray))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("API Health:  ", Style::default().fg(Color::Gray)),
            Span::styled(health_label, Style::default().fg(health_color)),
        ]),
        Line::from(vec![
            Span::styled("Last Sync:   ", Style::default().fg(Color::Gray)),
            Span::raw(format_last_sync(state.last_sync)),
        ]),
        Line::from(vec![
            Span::styled("Sync:        ", Style::default().fg(Color::Gray)),
            sync_label,
        ]),
    ];

    if let HealthStatus::Healthy(Health {
        supabase_configured: Some(configured),
        ..
    }) = health
    {
        let (text, color) = if *configured {
            ("configured", Color::Green)
        } else {
            ("not configured", Color::Red)
        };
        lines.push(Line::from(vec![
            Span::styled("Database:    ", Style::default().fg(Color::Gray)),
            Span::styled(text, Style::default().fg(color)),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "s sync now   h check health   r refresh stats",
        Style::default().fg(Color::DarkGray),
    )));

    Paragraph::new(lines).block(block).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Stats;

    fn render_text(state: &State, health: &HealthStatus) -> String {
        let area = Rect::new(0, 0, 100, 14);
        let mut buf = Buffer::empty(area);
        DashboardView::new(state, health).render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_counts_and_never_synced() {
        let state = State {
            stats: Stats {
                total_docs: 1200,
                total_packages: 30,
                total_issues: 7,
            },
            ..State::default()
        };

        let text = render_text(&state, &HealthStatus::Unknown);
        assert!(text.contains("1,200"));
        assert!(text.contains("30"));
        assert!(text.contains("Never"));
        assert!(text.contains("Unknown"));
    }

    #[test]
    fn test_renders_health_down() {
        let text = render_text(
            &State::default(),
            &HealthStatus::Down("API is not responding".to_string()),
        );
        assert!(text.contains("API is not responding"));
    }

    #[test]
    fn test_health_indicator_colors() {
        let ok = HealthStatus::Healthy(Health {
            status: "ok".to_string(),
            version: Some("1.0.0".to_string()),
            supabase_configured: Some(true),
        });
        assert_eq!(ok.indicator(), ("ok (v1.0.0)".to_string(), Color::Green));
        assert_eq!(
            HealthStatus::Down("x".to_string()).indicator().1,
            Color::Red
        );
        assert_eq!(HealthStatus::Checking.indicator().1, Color::Yellow);
    }
}
