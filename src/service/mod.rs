//! Data operations over the API client and the store.
//!
//! # Architecture
//!
//! - **fetch**: cached, paginated fetches for docs, packages and issues
//! - **gate**: latest-request-wins tracking per operation kind
//!
//! Every operation that reaches the network clears the store's error slot
//! when it starts, then catches its own failures and records them there.
//! Nothing here returns an error except [`DataService::check_health`],
//! whose caller renders the status.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use flutterlens::api::ApiClient;
//! use flutterlens::service::{DataService, FetchQuery};
//! use flutterlens::store::{CacheTtls, Store};
//!
//! # async fn run() {
//! let client = ApiClient::new("http://localhost:8000", Duration::from_secs(30));
//! let service = DataService::new(client, Store::new(CacheTtls::default()));
//! service.fetch_docs(FetchQuery::new().limit(10)).await;
//! println!("{} docs", service.store().read(|s| s.docs.len()));
//! # }
//! ```

mod fetch;
mod gate;

pub use gate::RequestGate;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, Health};
use crate::store::{Action, LoadingKey, Store};
use fetch::{Docs, Issues, Packages};

/// Default page size for collection fetches.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Default result limit for combined search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Page size used by the initial load.
pub const INITIAL_PAGE_SIZE: u32 = 10;

/// Message shown when the health check fails for any reason.
pub const HEALTH_DOWN_MESSAGE: &str = "API is not responding";

/// Health check failure. Details are logged, not surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("API is not responding")]
    NotResponding,
}

/// Parameters for a collection fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    /// Page size.
    pub limit: u32,
    /// Search text (docs, packages) or label filter (issues).
    pub filter: String,
    /// Number of items to skip.
    pub offset: u64,
    /// Whether a valid cache entry may be used.
    pub use_cache: bool,
}

impl Default for FetchQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            filter: String::new(),
            offset: 0,
            use_cache: true,
        }
    }
}

impl FetchQuery {
    /// Creates a query with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the filter term.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets whether the cache may be used.
    #[must_use]
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Returns true for the unfiltered first page, the only one cached.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.offset == 0 && self.filter.trim().is_empty()
    }
}

/// Fetch, search, sync and health operations bound to one store.
///
/// Cloning is cheap; clones share the client, the store and the gate.
#[derive(Debug, Clone)]
pub struct DataService {
    client: ApiClient,
    store: Store,
    gate: RequestGate,
}

impl DataService {
    /// Creates a service over `client` writing into `store`.
    #[must_use]
    pub fn new(client: ApiClient, store: Store) -> Self {
        Self {
            client,
            store,
            gate: RequestGate::new(),
        }
    }

    /// Returns the store handle.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns the API client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetches documentation pages.
    pub async fn fetch_docs(&self, query: FetchQuery) {
        self.fetch_collection::<Docs>(query).await;
    }

    /// Fetches packages.
    pub async fn fetch_packages(&self, query: FetchQuery) {
        self.fetch_collection::<Packages>(query).await;
    }

    /// Fetches issues. The query filter is a label filter.
    pub async fn fetch_issues(&self, query: FetchQuery) {
        self.fetch_collection::<Issues>(query).await;
    }

    /// Appends the next page of docs, if the cursor has more.
    pub async fn fetch_more_docs(&self, limit: u32, search: &str) {
        self.fetch_next::<Docs>(limit, search).await;
    }

    /// Appends the next page of packages, if the cursor has more.
    pub async fn fetch_more_packages(&self, limit: u32, search: &str) {
        self.fetch_next::<Packages>(limit, search).await;
    }

    /// Appends the next page of issues, if the cursor has more.
    pub async fn fetch_more_issues(&self, limit: u32, labels: &str) {
        self.fetch_next::<Issues>(limit, labels).await;
    }

    /// Fetches aggregate counts, using the cache when allowed.
    pub async fn fetch_stats(&self, use_cache: bool) {
        if use_cache {
            let now = Utc::now();
            if let Some(stats) = self.store.read(|s| s.cache.stats.get(now).copied()) {
                debug!("[FETCH] stats served from cache");
                self.gate.start(LoadingKey::Stats);
                self.store.dispatch(Action::SetStats {
                    stats,
                    cache_at: None,
                });
                self.store.dispatch(Action::SetLoading(LoadingKey::Stats, false));
                return;
            }
        }

        let id = self.gate.start(LoadingKey::Stats);
        self.store.dispatch(Action::ClearError);
        self.store.dispatch(Action::SetLoading(LoadingKey::Stats, true));

        let Some(result) = self
            .gate
            .run(LoadingKey::Stats, id, self.client.stats())
            .await
        else {
            debug!("[FETCH] stats request {} superseded", id);
            return;
        };

        match result {
            Ok(stats) => {
                info!(
                    "[FETCH] stats docs={} packages={} issues={}",
                    stats.total_docs, stats.total_packages, stats.total_issues
                );
                self.store.dispatch(Action::SetStats {
                    stats,
                    cache_at: Some(Utc::now()),
                });
            }
            Err(e) => {
                warn!("[FETCH] stats failed: {}", e);
                self.store.dispatch(Action::SetError(e.to_string()));
            }
        }

        self.store.dispatch(Action::SetLoading(LoadingKey::Stats, false));
    }

    /// Searches all kinds at once.
    ///
    /// A blank query is rejected without a request. Results replace the
    /// previous ones; a failed search leaves the previous results in place.
    pub async fn search_all(&self, query: &str, limit: u32) {
        let query = query.trim();
        if query.is_empty() {
            self.store
                .dispatch(Action::SetError(ApiError::empty_query().to_string()));
            return;
        }

        let id = self.gate.start(LoadingKey::Search);
        self.store.dispatch(Action::ClearError);
        self.store.dispatch(Action::SetLoading(LoadingKey::Search, true));
        info!("[SEARCH] q={:?} limit={}", query, limit);

        let Some(result) = self
            .gate
            .run(LoadingKey::Search, id, self.client.search(query, limit))
            .await
        else {
            debug!("[SEARCH] request {} superseded", id);
            return;
        };

        match result {
            Ok(results) => {
                info!("[SEARCH] {} results for {:?}", results.total_results, query);
                self.store.dispatch(Action::SetSearchResults(results));
            }
            Err(e) => {
                warn!("[SEARCH] failed: {}", e);
                self.store.dispatch(Action::SetError(e.to_string()));
            }
        }

        self.store.dispatch(Action::SetLoading(LoadingKey::Search, false));
    }

    /// Drops every cache entry and refetches all kinds.
    ///
    /// Sub-fetch failures land in the error slot; the sync time is
    /// recorded regardless.
    pub async fn trigger_sync(&self) {
        info!("[SYNC] Starting full sync");
        self.store.dispatch(Action::SetLoading(LoadingKey::Sync, true));
        self.store.dispatch(Action::ClearCache);

        let fresh = FetchQuery::new().use_cache(false);
        tokio::join!(
            self.fetch_docs(fresh.clone()),
            self.fetch_packages(fresh.clone()),
            self.fetch_issues(fresh),
            self.fetch_stats(false),
        );

        let finished = Utc::now();
        self.store.dispatch(Action::SetLastSync(finished));
        self.store.dispatch(Action::SetLoading(LoadingKey::Sync, false));

        let error = self.store.read(|s| s.error.clone());
        match error {
            Some(e) => warn!("[SYNC] Finished at {} with error: {}", finished, e),
            None => info!("[SYNC] Finished at {}", finished),
        }
    }

    /// Loads stats and the first page of each collection concurrently.
    pub async fn load_initial(&self) {
        info!("[FETCH] Initial load");
        let first = FetchQuery::new().limit(INITIAL_PAGE_SIZE);
        tokio::join!(
            self.fetch_stats(true),
            self.fetch_docs(first.clone()),
            self.fetch_packages(first.clone()),
            self.fetch_issues(first),
        );
    }

    /// Checks API health.
    ///
    /// # Errors
    /// Returns [`HealthError::NotResponding`] on any failure.
    pub async fn check_health(&self) -> Result<Health, HealthError> {
        self.client.health().await.map_err(|e| {
            warn!("[HEALTH] {} failed: {}", self.client.base_url(), e);
            HealthError::NotResponding
        })
    }

    /// Clears the error slot.
    pub fn clear_error(&self) {
        self.store.dispatch(Action::ClearError);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_query_defaults() {
        let query = FetchQuery::new();
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert!(query.filter.is_empty());
        assert_eq!(query.offset, 0);
        assert!(query.use_cache);
        assert!(query.is_canonical());
    }

    #[test]
    fn test_fetch_query_canonical() {
        assert!(!FetchQuery::new().filter("bloc").is_canonical());
        assert!(!FetchQuery::new().offset(50).is_canonical());
        assert!(FetchQuery::new().filter("   ").is_canonical());
        assert!(FetchQuery::new().use_cache(false).is_canonical());
    }

    #[test]
    fn test_health_error_message() {
        assert_eq!(HealthError::NotResponding.to_string(), HEALTH_DOWN_MESSAGE);
    }
}
