//! State container for the dashboard.
//!
//! # Architecture
//!
//! - **cache**: per-kind TTL entries for canonical first pages
//! - **state**: collections, loading flags, cursors, error slot
//! - **action**: the closed set of transitions and the pure reducer
//!
//! [`Store`] is the shared handle. Consumers receive it explicitly; there
//! is no global instance. Each dispatch runs under a write lock, so a
//! transition is never observed half-applied.

mod action;
mod cache;
mod state;

pub use action::{Action, Page, reduce};
pub use cache::{
    CacheEntry, CacheKind, CacheStore, CacheTtls, DEFAULT_DOCS_TTL_SECS, DEFAULT_ISSUES_TTL_SECS,
    DEFAULT_PACKAGES_TTL_SECS, DEFAULT_STATS_TTL_SECS,
};
pub use state::{Cursor, Cursors, LoadingFlags, LoadingKey, State};

use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to the dashboard state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<State>>,
}

impl Store {
    /// Creates a store with an empty state using `ttls`.
    #[must_use]
    pub fn new(ttls: CacheTtls) -> Self {
        Self::from_state(State::new(ttls))
    }

    /// Creates a store holding `state`.
    #[must_use]
    pub fn from_state(state: State) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Applies `action` to the state.
    pub fn dispatch(&self, action: Action) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut *guard);
        *guard = reduce(current, action);
    }

    /// Runs `f` against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> State {
        self.read(State::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_visible_to_clones() {
        let store = Store::default();
        let other = store.clone();

        store.dispatch(Action::SetError("offline".to_string()));

        assert_eq!(other.read(|s| s.error.clone()).as_deref(), Some("offline"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = Store::default();
        let before = store.snapshot();

        store.dispatch(Action::SetLoading(LoadingKey::Sync, true));

        assert!(!before.is_loading(LoadingKey::Sync));
        assert!(store.snapshot().is_loading(LoadingKey::Sync));
    }

    #[test]
    fn test_new_keeps_ttls() {
        let ttls = CacheTtls {
            stats: std::time::Duration::from_secs(9),
            ..CacheTtls::default()
        };
        let store = Store::new(ttls);
        assert_eq!(
            store.read(|s| s.cache.stats.ttl()),
            std::time::Duration::from_secs(9)
        );
    }
}
