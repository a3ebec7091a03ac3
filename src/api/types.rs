//! Response shapes consumed from the FlutterLens API.
//!
//! Item records are best-effort: every display field is optional and any
//! field the client does not know about is kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Flutter documentation page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    /// Server-assigned identifier (number or string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Page title.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// Full page content.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<String>,
    /// Generated summary.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    /// Documentation category.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    /// Source URL.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    /// Last update timestamp as sent by the server.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    /// Creation timestamp as sent by the server.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Popularity metrics scraped from pub.dev.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageScores {
    /// Like count.
    #[serde(default, deserialize_with = "lenient::count")]
    pub likes: Option<u64>,
    /// Popularity score (0.0 to 1.0).
    #[serde(default, deserialize_with = "lenient::score")]
    pub popularity: Option<f64>,
    /// Pub points.
    #[serde(default, rename = "pubPoints", deserialize_with = "lenient::count")]
    pub pub_points: Option<u64>,
}

/// A pub.dev package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Package name.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Package description.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Generated summary.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    /// Latest version.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    /// Like count reported at the top level.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub likes: Option<u64>,
    /// pub.dev page.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pub_url: Option<String>,
    /// Homepage or repository URL.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    /// Last update timestamp.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    /// Raw scores from the scraper.
    #[serde(
        default,
        deserialize_with = "lenient::record",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw: Option<PackageScores>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Package {
    /// Returns the package scores, preferring the raw scraper values.
    #[must_use]
    pub fn scores(&self) -> PackageScores {
        let raw = self.raw.unwrap_or_default();
        PackageScores {
            likes: raw.likes.or(self.likes),
            popularity: raw.popularity,
            pub_points: raw.pub_points,
        }
    }
}

/// A GitHub issue from the flutter/flutter tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// GitHub issue number.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub issue_number: Option<u64>,
    /// Issue title.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// Issue body.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<String>,
    /// Generated summary.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    /// "open" or "closed".
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    /// Label names.
    #[serde(
        default,
        deserialize_with = "lenient::labels",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub labels: Vec<String>,
    /// Issue URL.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    /// Creation timestamp.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Common display accessors for resource items.
pub trait Resource {
    /// Primary display text.
    fn heading(&self) -> Option<&str>;

    /// Longer text: summary first, then the full body.
    fn blurb(&self) -> Option<&str>;

    /// Most relevant timestamp for display.
    fn timestamp(&self) -> Option<&str>;

    /// Returns true if the heading or blurb contains `term`, ignoring case.
    ///
    /// An empty term matches everything.
    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [self.heading(), self.blurb()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(&term))
    }
}

impl Resource for Doc {
    fn heading(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn blurb(&self) -> Option<&str> {
        self.summary.as_deref().or(self.content.as_deref())
    }

    fn timestamp(&self) -> Option<&str> {
        self.updated_at.as_deref().or(self.created_at.as_deref())
    }
}

impl Resource for Package {
    fn heading(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn blurb(&self) -> Option<&str> {
        self.summary.as_deref().or(self.description.as_deref())
    }

    fn timestamp(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

impl Resource for Issue {
    fn heading(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn blurb(&self) -> Option<&str> {
        self.summary.as_deref().or(self.body.as_deref())
    }

    fn timestamp(&self) -> Option<&str> {
        self.updated_at.as_deref().or(self.created_at.as_deref())
    }
}

/// Server-side pagination metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageInfo {
    /// Offset of the first item in this page.
    #[serde(default)]
    pub offset: u64,
    /// Whether more items exist beyond this page.
    #[serde(default)]
    pub has_more: bool,
}

/// One page of a resource collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    /// Items in server order.
    pub data: Vec<T>,
    /// Total number of matching items, when the server reports it.
    pub total: Option<u64>,
    /// Pagination metadata, when the server reports it.
    pub pagination: Option<PageInfo>,
}

impl<T> ListResponse<T> {
    /// Creates a response with only data.
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            total: None,
            pagination: None,
        }
    }

    /// Sets the reported total.
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sets the pagination metadata.
    #[must_use]
    pub fn with_pagination(mut self, offset: u64, has_more: bool) -> Self {
        self.pagination = Some(PageInfo { offset, has_more });
        self
    }
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Wire form of a list endpoint body.
///
/// Older API deployments return a bare array instead of the envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Envelope {
        data: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        pagination: Option<PageInfo>,
    },
    Bare(Vec<T>),
}

impl<T> From<ListBody<T>> for ListResponse<T> {
    fn from(body: ListBody<T>) -> Self {
        match body {
            ListBody::Envelope {
                data,
                total,
                pagination,
            } => Self {
                data,
                total,
                pagination,
            },
            ListBody::Bare(data) => Self::new(data),
        }
    }
}

/// Per-kind results of a combined search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub docs: Vec<Doc>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Response of `/api/flutter/search`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    /// Query as echoed by the server.
    #[serde(default)]
    pub query: String,
    /// Number of results across all kinds.
    #[serde(default)]
    pub total_results: u64,
    /// Grouped results.
    #[serde(default)]
    pub results: SearchResults,
}

impl SearchResponse {
    /// Returns true when the search matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_results == 0
    }
}

/// Aggregate item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub total_docs: u64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub total_packages: u64,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub total_issues: u64,
}

/// Response of `/health`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Health {
    /// "ok" when the API is healthy.
    #[serde(default)]
    pub status: String,
    /// API version.
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the backing database is configured.
    #[serde(default)]
    pub supabase_configured: Option<bool>,
}

impl Health {
    /// Returns true if the server reported an "ok" status.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Tolerant decoders for item display fields.
///
/// A field with an unexpected shape (null, wrong type) reads as absent
/// instead of rejecting the whole page.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub(super) fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(as_count(&Value::deserialize(d)?))
    }

    pub(super) fn count_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(count(d)?.unwrap_or(0))
    }

    pub(super) fn score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let score = match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        Ok(score.filter(|v| v.is_finite()))
    }

    /// Label names. GitHub label objects contribute their `name`.
    pub(super) fn labels<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                Value::Object(label) => label
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect())
    }

    pub(super) fn record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }

    fn as_count(value: &Value) -> Option<u64> {
        match value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_body_envelope() {
        let body: ListBody<Doc> = serde_json::from_value(json!({
            "data": [{"id": 1, "title": "A"}],
            "total": 1,
            "pagination": {"offset": 0, "has_more": false}
        }))
        .unwrap();
        let response = ListResponse::from(body);

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].title.as_deref(), Some("A"));
        assert_eq!(response.data[0].id, Some(json!(1)));
        assert_eq!(response.total, Some(1));
        assert_eq!(
            response.pagination,
            Some(PageInfo {
                offset: 0,
                has_more: false
            })
        );
    }

    #[test]
    fn test_list_body_bare_array() {
        let body: ListBody<Package> =
            serde_json::from_value(json!([{"name": "provider"}, {"name": "bloc"}])).unwrap();
        let response = ListResponse::from(body);

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.total, None);
        assert_eq!(response.pagination, None);
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let doc: Doc = serde_json::from_value(json!({
            "title": "Widgets",
            "source": "docs.flutter.dev"
        }))
        .unwrap();

        assert_eq!(doc.extra.get("source"), Some(&json!("docs.flutter.dev")));
    }

    #[test]
    fn test_package_scores_prefer_raw() {
        let pkg: Package = serde_json::from_value(json!({
            "name": "http",
            "likes": 10,
            "raw": {"likes": 7000, "popularity": 0.99, "pubPoints": 160}
        }))
        .unwrap();

        let scores = pkg.scores();
        assert_eq!(scores.likes, Some(7000));
        assert_eq!(scores.pub_points, Some(160));

        let bare: Package = serde_json::from_value(json!({"name": "x", "likes": 3})).unwrap();
        assert_eq!(bare.scores().likes, Some(3));
    }

    #[test]
    fn test_resource_matches() {
        let doc = Doc {
            title: Some("Layout Widgets".to_string()),
            content: Some("Rows and columns".to_string()),
            ..Doc::default()
        };

        assert!(doc.matches(""));
        assert!(doc.matches("layout"));
        assert!(doc.matches("COLUMNS"));
        assert!(!doc.matches("navigator"));
    }

    #[test]
    fn test_search_response_defaults() {
        let response: SearchResponse = serde_json::from_value(json!({
            "total_results": 0,
            "results": {"docs": [], "packages": [], "issues": []}
        }))
        .unwrap();

        assert!(response.is_empty());
        assert!(response.query.is_empty());
    }

    #[test]
    fn test_health_is_ok() {
        let health: Health = serde_json::from_value(json!({"status": "OK"})).unwrap();
        assert!(health.is_ok());

        let degraded: Health = serde_json::from_value(json!({"status": "degraded"})).unwrap();
        assert!(!degraded.is_ok());
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let body: ListBody<Issue> = serde_json::from_value(json!({
            "data": [
                {"id": 1, "labels": ["bug"]},
                {"id": 2, "labels": null, "issue_number": null, "title": null}
            ]
        }))
        .unwrap();
        let response = ListResponse::from(body);

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].labels, vec!["bug".to_string()]);
        assert!(response.data[1].labels.is_empty());
        assert_eq!(response.data[1].issue_number, None);
        assert_eq!(response.data[1].title, None);
    }

    #[test]
    fn test_mistyped_fields_read_leniently() {
        let issue: Issue = serde_json::from_value(json!({
            "issue_number": "4242",
            "title": 17,
            "labels": [{"name": "P1"}, "framework", 3]
        }))
        .unwrap();
        assert_eq!(issue.issue_number, Some(4242));
        assert_eq!(issue.title.as_deref(), Some("17"));
        assert_eq!(issue.labels, vec!["P1".to_string(), "framework".to_string()]);

        let pkg: Package = serde_json::from_value(json!({
            "name": "http",
            "likes": null,
            "raw": {"likes": 12.0, "popularity": "0.5", "pubPoints": null}
        }))
        .unwrap();
        let scores = pkg.scores();
        assert_eq!(scores.likes, Some(12));
        assert_eq!(scores.popularity, Some(0.5));
        assert_eq!(scores.pub_points, None);

        let odd_raw: Package = serde_json::from_value(json!({"name": "x", "raw": "n/a"})).unwrap();
        assert_eq!(odd_raw.raw, None);
    }

    #[test]
    fn test_stats_null_counts_are_zero() {
        let stats: Stats =
            serde_json::from_value(json!({"total_docs": null, "total_packages": 5})).unwrap();
        assert_eq!(stats.total_docs, 0);
        assert_eq!(stats.total_packages, 5);
        assert_eq!(stats.total_issues, 0);
    }
}
