//! Latest-request-wins gate.
//!
//! Each new request for a kind bumps that kind's request ID and wakes the
//! older waiters, so a slow earlier response cannot overwrite the state a
//! newer request produced.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;

use crate::store::LoadingKey;

/// Request tracking for one kind.
#[derive(Debug, Default)]
struct Lane {
    /// Current request ID (incremented on each start).
    current_id: AtomicU64,
    /// Wakes superseded requests.
    superseded: Notify,
}

/// Per-kind request gates.
#[derive(Debug, Clone)]
pub struct RequestGate {
    lanes: Arc<HashMap<LoadingKey, Lane>>,
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestGate {
    /// Creates a gate with one lane per loading key.
    #[must_use]
    pub fn new() -> Self {
        let lanes = LoadingKey::ALL
            .into_iter()
            .map(|key| (key, Lane::default()))
            .collect();
        Self {
            lanes: Arc::new(lanes),
        }
    }

    fn lane(&self, key: LoadingKey) -> &Lane {
        // Every key is inserted in `new`.
        &self.lanes[&key]
    }

    /// Starts a request for `key`, superseding any older one.
    ///
    /// Returns the request ID.
    pub fn start(&self, key: LoadingKey) -> u64 {
        let lane = self.lane(key);
        let id = lane.current_id.fetch_add(1, Ordering::SeqCst) + 1;
        lane.superseded.notify_waiters();
        id
    }

    /// Returns true if `id` is still the newest request for `key`.
    #[must_use]
    pub fn is_current(&self, key: LoadingKey, id: u64) -> bool {
        self.lane(key).current_id.load(Ordering::SeqCst) == id
    }

    /// Returns the current request ID for `key`.
    #[must_use]
    pub fn current_id(&self, key: LoadingKey) -> u64 {
        self.lane(key).current_id.load(Ordering::SeqCst)
    }

    /// Resolves once `id` is no longer the newest request for `key`.
    async fn superseded(&self, key: LoadingKey, id: u64) {
        let lane = self.lane(key);
        loop {
            let notified = lane.superseded.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if !self.is_current(key, id) {
                return;
            }
            notified.await;
        }
    }

    /// Runs `request` unless a newer request for `key` starts first.
    ///
    /// Returns `None` when superseded; the in-flight request is dropped.
    pub async fn run<F: Future>(&self, key: LoadingKey, id: u64, request: F) -> Option<F::Output> {
        tokio::select! {
            output = request => {
                // A newer request may have started after this one resolved.
                self.is_current(key, id).then_some(output)
            }
            () = self.superseded(key, id) => None,
        }
    }
}
