//! Actions and the reducer.
//!
//! The reducer is a pure function of the current state and one action.
//! Timestamps used for cache stamping travel inside the action.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::cache::CacheEntry;
use super::state::{Cursor, LoadingKey, State};
use crate::api::{Doc, Issue, ListResponse, Package, SearchResponse, Stats};

/// A page of results as delivered to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Server response.
    pub response: ListResponse<T>,
    /// Offset the page was requested at.
    pub offset: u64,
    /// Capture time for the cache, when this is the canonical first page.
    pub cache_at: Option<DateTime<Utc>>,
}

impl<T> Page<T> {
    /// A first page that is not written to the cache.
    #[must_use]
    pub fn uncached(response: ListResponse<T>) -> Self {
        Self {
            response,
            offset: 0,
            cache_at: None,
        }
    }

    /// A first page that is written to the cache at `now`.
    #[must_use]
    pub fn cached(response: ListResponse<T>, now: DateTime<Utc>) -> Self {
        Self {
            response,
            offset: 0,
            cache_at: Some(now),
        }
    }

    /// A follow-up page requested at `offset`.
    #[must_use]
    pub fn at_offset(response: ListResponse<T>, offset: u64) -> Self {
        Self {
            response,
            offset,
            cache_at: None,
        }
    }
}

/// Every state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetLoading(LoadingKey, bool),
    SetError(String),
    ClearError,
    SetDocs(Page<Doc>),
    SetPackages(Page<Package>),
    SetIssues(Page<Issue>),
    AppendDocs(Page<Doc>),
    AppendPackages(Page<Package>),
    AppendIssues(Page<Issue>),
    SetSearchResults(SearchResponse),
    SetStats {
        stats: Stats,
        cache_at: Option<DateTime<Utc>>,
    },
    SetLastSync(DateTime<Utc>),
    ClearCache,
}

impl Action {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetLoading(..) => "SET_LOADING",
            Self::SetError(_) => "SET_ERROR",
            Self::ClearError => "CLEAR_ERROR",
            Self::SetDocs(_) => "SET_DOCS",
            Self::SetPackages(_) => "SET_PACKAGES",
            Self::SetIssues(_) => "SET_ISSUES",
            Self::AppendDocs(_) => "APPEND_DOCS",
            Self::AppendPackages(_) => "APPEND_PACKAGES",
            Self::AppendIssues(_) => "APPEND_ISSUES",
            Self::SetSearchResults(_) => "SET_SEARCH_RESULTS",
            Self::SetStats { .. } => "SET_STATS",
            Self::SetLastSync(_) => "SET_LAST_SYNC",
            Self::ClearCache => "CLEAR_CACHE",
        }
    }
}

/// Applies `action` to `state`, returning the next state.
#[must_use]
pub fn reduce(mut state: State, action: Action) -> State {
    debug!("[STORE] {}", action.name());

    match action {
        Action::SetLoading(key, loading) => state.loading.set(key, loading),
        Action::SetError(message) => state.error = Some(message),
        Action::ClearError => state.error = None,
        Action::SetDocs(page) => {
            let total = replace(&mut state.docs, &mut state.cursors.docs, &mut state.cache.docs, page);
            state.stats.total_docs = total;
        }
        Action::SetPackages(page) => {
            let total = replace(
                &mut state.packages,
                &mut state.cursors.packages,
                &mut state.cache.packages,
                page,
            );
            state.stats.total_packages = total;
        }
        Action::SetIssues(page) => {
            let total = replace(
                &mut state.issues,
                &mut state.cursors.issues,
                &mut state.cache.issues,
                page,
            );
            state.stats.total_issues = total;
        }
        Action::AppendDocs(page) => {
            state.stats.total_docs = append(&mut state.docs, &mut state.cursors.docs, page);
        }
        Action::AppendPackages(page) => {
            state.stats.total_packages =
                append(&mut state.packages, &mut state.cursors.packages, page);
        }
        Action::AppendIssues(page) => {
            state.stats.total_issues = append(&mut state.issues, &mut state.cursors.issues, page);
        }
        Action::SetSearchResults(results) => state.search_results = Some(results),
        Action::SetStats { stats, cache_at } => {
            state.stats = stats;
            if let Some(now) = cache_at {
                state.cache.stats.put(stats, now);
            }
        }
        Action::SetLastSync(at) => state.last_sync = Some(at),
        Action::ClearCache => state.cache.clear_all(),
    }

    state
}

/// Replaces a collection with a first page. Returns the new total.
fn replace<T: Clone>(
    items: &mut Vec<T>,
    cursor: &mut Cursor,
    cache: &mut CacheEntry<ListResponse<T>>,
    page: Page<T>,
) -> u64 {
    let Page {
        response,
        offset,
        cache_at,
    } = page;

    *cursor = Cursor::after_page(
        response.pagination,
        offset,
        response.data.len(),
        response.data.len(),
        response.total,
    );
    let total = response.total.unwrap_or(response.data.len() as u64);

    if let Some(now) = cache_at {
        if !response.data.is_empty() {
            cache.put(response.clone(), now);
        }
    }

    *items = response.data;
    total
}

/// Appends a follow-up page. Returns the new total.
fn append<T>(items: &mut Vec<T>, cursor: &mut Cursor, page: Page<T>) -> u64 {
    let Page {
        response, offset, ..
    } = page;
    let received = response.data.len();

    items.extend(response.data);
    *cursor = Cursor::after_page(response.pagination, offset, received, items.len(), response.total);

    response.total.unwrap_or(items.len() as u64)
}
