//! FlutterLens REST API access.
//!
//! # Architecture
//!
//! - **client**: async reqwest client with fixed base URL and timeout
//! - **error**: failure classification and display messages
//! - **types**: response shapes for docs, packages, issues, search, stats
//!
//! The base URL is resolved once at startup by [`resolve_base_url`].

mod client;
mod error;
mod types;

pub use client::{
    ApiClient, DEFAULT_TIMEOUT_SECS, DOCS_PATH, HEALTH_PATH, ISSUES_PATH, ListParams,
    PACKAGES_PATH, SEARCH_PATH, STATS_PATH,
};
pub use error::{ApiError, EMPTY_QUERY_MESSAGE, ErrorKind};
pub use types::{
    Doc, Health, Issue, ListResponse, Package, PackageScores, PageInfo, Resource, SearchResponse,
    SearchResults, Stats,
};

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "FLUTTERLENS_API_URL";

/// API used when the dashboard runs against a local host.
pub const LOCAL_API_URL: &str = "http://localhost:8000";

/// Hosted API.
pub const PRODUCTION_API_URL: &str = "https://flutterlens.vercel.app";

/// Returns true if `host` names the local machine.
#[must_use]
pub fn is_local_host(host: &str) -> bool {
    matches!(
        host.trim().to_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "::1" | "[::1]"
    )
}

/// Picks the API base URL.
///
/// Precedence: `env_override`, then `configured`, then the local default
/// when `origin_host` is the local machine, then the production URL.
/// Blank values are ignored.
#[must_use]
pub fn resolve_base_url(
    env_override: Option<&str>,
    configured: Option<&str>,
    origin_host: Option<&str>,
) -> String {
    let explicit = [env_override, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty());

    if let Some(url) = explicit {
        return url.to_string();
    }

    if origin_host.is_some_and(is_local_host) {
        LOCAL_API_URL.to_string()
    } else {
        PRODUCTION_API_URL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let url = resolve_base_url(
            Some("http://api.test"),
            Some("http://config.test"),
            Some("localhost"),
        );
        assert_eq!(url, "http://api.test");
    }

    #[test]
    fn test_configured_before_host() {
        let url = resolve_base_url(None, Some("http://config.test"), Some("localhost"));
        assert_eq!(url, "http://config.test");
    }

    #[test]
    fn test_blank_override_ignored() {
        let url = resolve_base_url(Some("  "), None, Some("127.0.0.1"));
        assert_eq!(url, LOCAL_API_URL);
    }

    #[test]
    fn test_production_fallback() {
        assert_eq!(resolve_base_url(None, None, None), PRODUCTION_API_URL);
        assert_eq!(
            resolve_base_url(None, None, Some("dashboard.example.com")),
            PRODUCTION_API_URL
        );
    }

    #[test]
    fn test_is_local_host() {
        assert!(is_local_host("localhost"));
        assert!(is_local_host("LOCALHOST"));
        assert!(is_local_host("::1"));
        assert!(!is_local_host("flutterlens.vercel.app"));
    }
}
