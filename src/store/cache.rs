//! Time-to-live cache for the canonical first page of each resource kind.
//!
//! Only unfiltered, offset-zero responses are cached. Validity is a pure
//! function of the caller-supplied `now`, so the cache never reads the clock.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::api::{Doc, Issue, ListResponse, Package, Stats};

/// Default docs TTL in seconds (5 minutes).
pub const DEFAULT_DOCS_TTL_SECS: u64 = 5 * 60;

/// Default packages TTL in seconds (10 minutes).
pub const DEFAULT_PACKAGES_TTL_SECS: u64 = 10 * 60;

/// Default issues TTL in seconds (15 minutes).
pub const DEFAULT_ISSUES_TTL_SECS: u64 = 15 * 60;

/// Default stats TTL in seconds (2 minutes).
pub const DEFAULT_STATS_TTL_SECS: u64 = 2 * 60;

/// Resource kinds that have a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Docs,
    Packages,
    Issues,
    Stats,
}

impl CacheKind {
    /// All cacheable kinds.
    pub const ALL: [Self; 4] = [Self::Docs, Self::Packages, Self::Issues, Self::Stats];

    /// Returns the kind name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::Packages => "packages",
            Self::Issues => "issues",
            Self::Stats => "stats",
        }
    }
}

/// Per-kind time-to-live configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub docs: Duration,
    pub packages: Duration,
    pub issues: Duration,
    pub stats: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            docs: Duration::from_secs(DEFAULT_DOCS_TTL_SECS),
            packages: Duration::from_secs(DEFAULT_PACKAGES_TTL_SECS),
            issues: Duration::from_secs(DEFAULT_ISSUES_TTL_SECS),
            stats: Duration::from_secs(DEFAULT_STATS_TTL_SECS),
        }
    }
}

impl CacheTtls {
    /// Returns the TTL for a kind.
    #[must_use]
    pub fn get(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::Docs => self.docs,
            CacheKind::Packages => self.packages,
            CacheKind::Issues => self.issues,
            CacheKind::Stats => self.stats,
        }
    }

    /// Sets the TTL for a kind.
    pub fn set(&mut self, kind: CacheKind, ttl: Duration) {
        match kind {
            CacheKind::Docs => self.docs = ttl,
            CacheKind::Packages => self.packages = ttl,
            CacheKind::Issues => self.issues = ttl,
            CacheKind::Stats => self.stats = ttl,
        }
    }
}

/// Cached value with capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// Cached value, if any.
    data: Option<T>,
    /// When the value was captured.
    captured_at: Option<DateTime<Utc>>,
    /// Time-to-live.
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// Creates an empty entry.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: None,
            captured_at: None,
            ttl,
        }
    }

    /// Returns true if the entry holds data younger than its TTL.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        let Some(captured_at) = self.captured_at else {
            return false;
        };
        if self.data.is_none() {
            return false;
        }
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(captured_at) < ttl
    }

    /// Returns the data if the entry is valid at `now`.
    #[must_use]
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        if self.is_valid(now) {
            self.data.as_ref()
        } else {
            None
        }
    }

    /// Stores `data`, stamping it with `now`. The TTL is kept.
    pub fn put(&mut self, data: T, now: DateTime<Utc>) {
        self.data = Some(data);
        self.captured_at = Some(now);
    }

    /// Empties the entry.
    pub fn clear(&mut self) {
        self.data = None;
        self.captured_at = None;
    }

    /// Returns when the data was captured.
    #[must_use]
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    /// Returns the TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Cache entries for every cacheable kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStore {
    pub docs: CacheEntry<ListResponse<Doc>>,
    pub packages: CacheEntry<ListResponse<Package>>,
    pub issues: CacheEntry<ListResponse<Issue>>,
    pub stats: CacheEntry<Stats>,
}

impl CacheStore {
    /// Creates an empty store with the given TTLs.
    #[must_use]
    pub fn new(ttls: CacheTtls) -> Self {
        Self {
            docs: CacheEntry::new(ttls.docs),
            packages: CacheEntry::new(ttls.packages),
            issues: CacheEntry::new(ttls.issues),
            stats: CacheEntry::new(ttls.stats),
        }
    }

    /// Returns true if the entry for `kind` is valid at `now`.
    #[must_use]
    pub fn is_valid(&self, kind: CacheKind, now: DateTime<Utc>) -> bool {
        match kind {
            CacheKind::Docs => self.docs.is_valid(now),
            CacheKind::Packages => self.packages.is_valid(now),
            CacheKind::Issues => self.issues.is_valid(now),
            CacheKind::Stats => self.stats.is_valid(now),
        }
    }

    /// Returns the capture time of the entry for `kind`.
    #[must_use]
    pub fn captured_at(&self, kind: CacheKind) -> Option<DateTime<Utc>> {
        match kind {
            CacheKind::Docs => self.docs.captured_at(),
            CacheKind::Packages => self.packages.captured_at(),
            CacheKind::Issues => self.issues.captured_at(),
            CacheKind::Stats => self.stats.captured_at(),
        }
    }

    /// Empties every entry. TTLs are kept.
    pub fn clear_all(&mut self) {
        self.docs.clear();
        self.packages.clear();
        self.issues.clear();
        self.stats.clear();
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheTtls::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_empty_entry_is_invalid() {
        let entry: CacheEntry<Stats> = CacheEntry::new(Duration::from_secs(60));
        assert!(!entry.is_valid(at(0)));
        assert!(entry.get(at(0)).is_none());
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let mut entry = CacheEntry::new(Duration::from_secs(60));
        entry.put(Stats::default(), at(0));

        assert!(entry.is_valid(at(0)));
        assert!(entry.is_valid(at(59)));
        assert!(!entry.is_valid(at(60)));
        assert!(!entry.is_valid(at(61)));
    }

    #[test]
    fn test_zero_ttl_never_valid() {
        let mut entry = CacheEntry::new(Duration::ZERO);
        entry.put(Stats::default(), at(0));
        assert!(!entry.is_valid(at(0)));
    }

    #[test]
    fn test_put_overwrites_and_restamps() {
        let mut entry = CacheEntry::new(Duration::from_secs(60));
        entry.put(ListResponse::new(vec![Doc::default()]), at(0));
        entry.put(ListResponse::new(Vec::<Doc>::new()), at(100));

        assert_eq!(entry.captured_at(), Some(at(100)));
        assert_eq!(entry.get(at(101)).map(|r| r.data.len()), Some(0));
    }

    #[test]
    fn test_default_ttls() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.get(CacheKind::Docs), Duration::from_secs(300));
        assert_eq!(ttls.get(CacheKind::Packages), Duration::from_secs(600));
        assert_eq!(ttls.get(CacheKind::Issues), Duration::from_secs(900));
        assert_eq!(ttls.get(CacheKind::Stats), Duration::from_secs(120));
    }

    #[test]
    fn test_ttl_override() {
        let mut ttls = CacheTtls::default();
        ttls.set(CacheKind::Stats, Duration::from_secs(5));
        let mut store = CacheStore::new(ttls);
        store.stats.put(Stats::default(), at(0));

        assert!(store.is_valid(CacheKind::Stats, at(4)));
        assert!(!store.is_valid(CacheKind::Stats, at(5)));
    }

    #[test]
    fn test_clear_all() {
        let mut store = CacheStore::default();
        store.docs.put(ListResponse::new(vec![Doc::default()]), at(0));
        store.stats.put(Stats::default(), at(0));

        store.clear_all();

        for kind in CacheKind::ALL {
            assert!(!store.is_valid(kind, at(1)), "{} should be cleared", kind.as_str());
            assert!(store.captured_at(kind).is_none());
        }
        assert_eq!(store.docs.ttl(), Duration::from_secs(DEFAULT_DOCS_TTL_SECS));
    }

    proptest! {
        #[test]
        fn prop_validity_matches_elapsed(ttl_secs in 0u64..10_000, elapsed in -100i64..20_000) {
            let mut entry = CacheEntry::new(Duration::from_secs(ttl_secs));
            entry.put(Stats::default(), at(0));

            let expected = elapsed < i64::try_from(ttl_secs).unwrap();
            prop_assert_eq!(entry.is_valid(at(elapsed)), expected);
        }
    }
}
