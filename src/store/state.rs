//! Dashboard state held by the store.

use chrono::{DateTime, Utc};

use super::cache::{CacheStore, CacheTtls};
use crate::api::{Doc, Issue, Package, PageInfo, SearchResponse, Stats};

/// Operations that carry a loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadingKey {
    Docs,
    Packages,
    Issues,
    Search,
    Stats,
    Sync,
}

impl LoadingKey {
    /// All loading keys.
    pub const ALL: [Self; 6] = [
        Self::Docs,
        Self::Packages,
        Self::Issues,
        Self::Search,
        Self::Stats,
        Self::Sync,
    ];

    /// Returns the key name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::Packages => "packages",
            Self::Issues => "issues",
            Self::Search => "search",
            Self::Stats => "stats",
            Self::Sync => "sync",
        }
    }
}

/// In-flight flags, one per operation kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    docs: bool,
    packages: bool,
    issues: bool,
    search: bool,
    stats: bool,
    sync: bool,
}

impl LoadingFlags {
    /// Returns the flag for `key`.
    #[must_use]
    pub fn get(&self, key: LoadingKey) -> bool {
        match key {
            LoadingKey::Docs => self.docs,
            LoadingKey::Packages => self.packages,
            LoadingKey::Issues => self.issues,
            LoadingKey::Search => self.search,
            LoadingKey::Stats => self.stats,
            LoadingKey::Sync => self.sync,
        }
    }

    /// Sets the flag for `key`.
    pub fn set(&mut self, key: LoadingKey, loading: bool) {
        let slot = match key {
            LoadingKey::Docs => &mut self.docs,
            LoadingKey::Packages => &mut self.packages,
            LoadingKey::Issues => &mut self.issues,
            LoadingKey::Search => &mut self.search,
            LoadingKey::Stats => &mut self.stats,
            LoadingKey::Sync => &mut self.sync,
        };
        *slot = loading;
    }

    /// Returns true if any operation is in flight.
    #[must_use]
    pub fn any(&self) -> bool {
        LoadingKey::ALL.into_iter().any(|key| self.get(key))
    }
}

/// Pagination cursor for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Offset of the next page to request.
    pub offset: u64,
    /// Whether the server has more items after `offset`.
    pub has_more: bool,
}

impl Cursor {
    /// Cursor after a page of `received` items.
    ///
    /// Server metadata wins; without it, `has_more` is inferred from the
    /// reported total, and is false when no total is known.
    #[must_use]
    pub fn after_page(
        page: Option<PageInfo>,
        start: u64,
        received: usize,
        held: usize,
        total: Option<u64>,
    ) -> Self {
        let received = received as u64;
        match page {
            Some(info) => Self {
                offset: info.offset + received,
                has_more: info.has_more,
            },
            None => Self {
                offset: start + received,
                has_more: received > 0 && total.is_some_and(|t| (held as u64) < t),
            },
        }
    }
}

/// Cursors for the paginated kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursors {
    pub docs: Cursor,
    pub packages: Cursor,
    pub issues: Cursor,
}

/// The whole dashboard state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    /// Documentation pages, server order.
    pub docs: Vec<Doc>,
    /// Packages, server order.
    pub packages: Vec<Package>,
    /// Issues, server order.
    pub issues: Vec<Issue>,
    /// Most recent search results.
    pub search_results: Option<SearchResponse>,
    /// Aggregate counts.
    pub stats: Stats,
    /// In-flight flags.
    pub loading: LoadingFlags,
    /// Last error message.
    pub error: Option<String>,
    /// When the last sync completed.
    pub last_sync: Option<DateTime<Utc>>,
    /// Pagination cursors.
    pub cursors: Cursors,
    /// Cached first pages.
    pub cache: CacheStore,
}

impl State {
    /// Creates an empty state with the given cache TTLs.
    #[must_use]
    pub fn new(ttls: CacheTtls) -> Self {
        Self {
            cache: CacheStore::new(ttls),
            ..Self::default()
        }
    }

    /// Returns true if `key` is in flight.
    #[must_use]
    pub fn is_loading(&self, key: LoadingKey) -> bool {
        self.loading.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_flags() {
        let mut flags = LoadingFlags::default();
        assert!(!flags.any());

        flags.set(LoadingKey::Search, true);
        assert!(flags.get(LoadingKey::Search));
        assert!(!flags.get(LoadingKey::Docs));
        assert!(flags.any());

        flags.set(LoadingKey::Search, false);
        assert!(!flags.any());
    }

    #[test]
    fn test_cursor_from_page_info() {
        let info = PageInfo {
            offset: 50,
            has_more: true,
        };
        let cursor = Cursor::after_page(Some(info), 50, 25, 75, None);
        assert_eq!(cursor, Cursor { offset: 75, has_more: true });
    }

    #[test]
    fn test_cursor_without_page_info() {
        let cursor = Cursor::after_page(None, 0, 10, 10, Some(30));
        assert_eq!(cursor, Cursor { offset: 10, has_more: true });

        let cursor = Cursor::after_page(None, 20, 10, 30, Some(30));
        assert!(!cursor.has_more);

        let cursor = Cursor::after_page(None, 0, 10, 10, None);
        assert!(!cursor.has_more);
    }

    #[test]
    fn test_state_new_uses_ttls() {
        let ttls = CacheTtls {
            docs: std::time::Duration::from_secs(1),
            ..CacheTtls::default()
        };
        let state = State::new(ttls);
        assert_eq!(state.cache.docs.ttl(), std::time::Duration::from_secs(1));
        assert!(state.docs.is_empty());
        assert!(state.error.is_none());
    }
}
