//! HTTP client for the FlutterLens REST API.

use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::types::{Doc, Health, Issue, ListBody, ListResponse, Package, SearchResponse, Stats};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Docs endpoint.
pub const DOCS_PATH: &str = "/api/flutter/docs";
/// Packages endpoint.
pub const PACKAGES_PATH: &str = "/api/flutter/packages";
/// Issues endpoint.
pub const ISSUES_PATH: &str = "/api/flutter/issues";
/// Combined search endpoint.
pub const SEARCH_PATH: &str = "/api/flutter/search";
/// Stats endpoint.
pub const STATS_PATH: &str = "/api/flutter/stats";
/// Health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Query parameters for a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Page size.
    pub limit: u32,
    /// Filter value (search text or label list).
    pub filter: String,
    /// Number of items to skip.
    pub offset: u64,
}

impl ListParams {
    /// Builds the query pairs, naming the filter parameter `filter_key`.
    fn to_query(&self, filter_key: &'static str) -> Vec<(&'static str, String)> {
        vec![
            ("limit", self.limit.to_string()),
            (filter_key, self.filter.clone()),
            ("offset", self.offset.to_string()),
        ]
    }
}

/// Async client bound to one API base URL.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
    /// Per-request timeout.
    timeout: Duration,
}

impl ApiClient {
    /// Creates a client for `base_url` with the given request timeout.
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        assert!(!base_url.is_empty(), "Base URL must not be empty");
        assert!(!timeout.is_zero(), "Timeout must be positive");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(concat!("flutterlens/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a request and returns the decoded JSON body.
    ///
    /// Non-success statuses and transport failures are classified into
    /// [`ApiError`]. No retries are attempted.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[API] {} {} params={:?}", method, url, params);
        let start = Instant::now();

        let response = self
            .http
            .request(method.clone(), &url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!("[API] {} {} failed after {:?}: {}", method, path, start.elapsed(), e);
                ApiError::from_transport(&e)
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            warn!("[API] Failed to read body of {}: {}", path, e);
            ApiError::from_transport(&e)
        })?;
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();

        info!(
            "[API] {} {} -> {} in {:?} ({} bytes)",
            method,
            path,
            status.as_u16(),
            start.elapsed(),
            bytes.len()
        );

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), body.as_ref());
            warn!("[API] {} {} rejected: {}", method, path, err);
            return Err(err);
        }

        body.ok_or_else(|| {
            warn!("[API] {} {} returned a non-JSON body", method, path);
            ApiError::Unexpected(Some("Response was not valid JSON".to_string()))
        })
    }

    /// GETs `path` and decodes the body as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let value = self.request(Method::GET, path, params).await?;
        serde_json::from_value(value).map_err(|e| {
            warn!("[API] Failed to decode {} response: {}", path, e);
            ApiError::Unexpected(Some(format!("Failed to parse response: {}", e)))
        })
    }

    /// Fetches one page of a list endpoint.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        filter_key: &'static str,
        params: &ListParams,
    ) -> Result<ListResponse<T>, ApiError> {
        let body: ListBody<T> = self.get(path, &params.to_query(filter_key)).await?;
        Ok(body.into())
    }

    /// Fetches documentation pages; `params.filter` is search text.
    pub async fn docs(&self, params: &ListParams) -> Result<ListResponse<Doc>, ApiError> {
        self.list(DOCS_PATH, "search", params).await
    }

    /// Fetches packages; `params.filter` is search text.
    pub async fn packages(&self, params: &ListParams) -> Result<ListResponse<Package>, ApiError> {
        self.list(PACKAGES_PATH, "search", params).await
    }

    /// Fetches issues; `params.filter` is a label filter.
    pub async fn issues(&self, params: &ListParams) -> Result<ListResponse<Issue>, ApiError> {
        self.list(ISSUES_PATH, "labels", params).await
    }

    /// Runs a combined search across all kinds.
    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResponse, ApiError> {
        let params = [("q", query.to_string()), ("limit", limit.to_string())];
        self.get(SEARCH_PATH, &params).await
    }

    /// Fetches aggregate counts.
    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get(STATS_PATH, &[]).await
    }

    /// Fetches the health payload.
    pub async fn health(&self) -> Result<Health, ApiError> {
        self.get(HEALTH_PATH, &[]).await
    }
}
