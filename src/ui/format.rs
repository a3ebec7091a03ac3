//! Text formatting helpers shared by the dashboard widgets.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Maximum labels shown per issue before collapsing into "+N".
pub const MAX_VISIBLE_LABELS: usize = 3;

/// Placeholder for missing text.
pub const NO_CONTENT: &str = "No content available";

/// Placeholder for missing dates.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Shown when no sync has completed yet.
pub const NEVER_SYNCED: &str = "Never";

const ELLIPSIS: &str = "...";

/// Truncates `text` to at most `max_width` display columns.
///
/// Truncated text ends with "...". Newlines are flattened to spaces.
#[must_use]
pub fn truncate(text: &str, max_width: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if flat.width() <= max_width {
        return flat;
    }

    let ellipsis_width = ELLIPSIS.width();
    if max_width <= ellipsis_width {
        return ".".repeat(max_width);
    }

    let budget = max_width - ellipsis_width;
    let mut used = 0;
    let mut out = String::new();
    for c in flat.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Truncates optional text, substituting a placeholder when absent.
#[must_use]
pub fn truncate_or_placeholder(text: Option<&str>, max_width: usize) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => truncate(t, max_width),
        None => truncate(NO_CONTENT, max_width),
    }
}

/// Formats a server timestamp as a local date.
///
/// Accepts RFC 3339, naive ISO date-times and plain dates. Unparseable
/// values are shown as-is.
#[must_use]
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return UNKNOWN_DATE.to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// Formats the last sync time, or "Never".
#[must_use]
pub fn format_last_sync(last_sync: Option<DateTime<Utc>>) -> String {
    match last_sync {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => NEVER_SYNCED.to_string(),
    }
}

/// Formats issue labels: the first few, then "+N" for the rest.
#[must_use]
pub fn format_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let shown = labels
        .iter()
        .take(MAX_VISIBLE_LABELS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let hidden = labels.len().saturating_sub(MAX_VISIBLE_LABELS);
    if hidden > 0 {
        format!("{} +{}", shown, hidden)
    } else {
        shown
    }
}

/// Formats a count with thousands separators.
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a popularity score, which the scraper reports as 0.0 to 1.0.
#[must_use]
pub fn format_popularity(value: Option<f64>) -> String {
    match value {
        Some(p) if p <= 1.0 => format!("{:.0}%", p * 100.0),
        Some(p) => format!("{:.0}", p),
        None => "0%".to_string(),
    }
}
