//! In-process mock of the FlutterLens API for integration tests.
//!
//! Binds an axum server to 127.0.0.1:0. Each path gets a queue of canned
//! replies; the last reply repeats once the queue is down to one. Every
//! request is counted and its query string recorded.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use flutterlens::api::ApiClient;

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: Value,
    delay: Duration,
}

impl Reply {
    /// 200 with a JSON body.
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            delay: Duration::ZERO,
        }
    }

    /// Any status with a JSON body.
    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            delay: Duration::ZERO,
        }
    }

    /// Delays the reply.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    queries: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

/// Running mock server.
pub struct MockApi {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockApi {
    /// Starts a server with no routes; unknown paths answer 404.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind mock api");
        let addr = listener.local_addr().expect("mock api address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let server = axum::serve(listener, app);
            tokio::select! {
                _ = server => {}
                _ = shutdown_rx => {}
            }
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client for this server with a short timeout.
    pub fn client(&self) -> ApiClient {
        self.client_with_timeout(Duration::from_secs(5))
    }

    /// Client for this server with the given timeout.
    pub fn client_with_timeout(&self, timeout: Duration) -> ApiClient {
        ApiClient::new(&self.url(), timeout)
    }

    /// Replaces the replies for `path`.
    pub fn respond(&self, path: &str, reply: Reply) -> &Self {
        self.respond_seq(path, vec![reply])
    }

    /// Replaces the replies for `path` with a sequence.
    pub fn respond_seq(&self, path: &str, replies: Vec<Reply>) -> &Self {
        assert!(!replies.is_empty(), "Need at least one reply");
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into());
        self
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Total requests received.
    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }

    /// Query parameters of every request to `path`, oldest first.
    pub fn queries(&self, path: &str) -> Vec<HashMap<String, String>> {
        self.state
            .queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<MockState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
    state.queries.lock().unwrap().push((path.clone(), query));

    let reply = {
        let mut replies = state.replies.lock().unwrap();
        replies.get_mut(&path).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))).into_response();
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}

/// `{data, total}` list body.
pub fn list_body(items: Vec<Value>, total: u64) -> Value {
    json!({ "data": items, "total": total })
}

/// Documentation items with ids in `ids`.
pub fn docs(ids: std::ops::Range<u64>) -> Vec<Value> {
    ids.map(|i| json!({ "id": i, "title": format!("Doc {}", i), "content": "Flutter widgets" }))
        .collect()
}

/// Package items with ids in `ids`.
pub fn packages(ids: std::ops::Range<u64>) -> Vec<Value> {
    ids.map(|i| json!({ "id": i, "name": format!("pkg_{}", i), "version": "1.0.0" }))
        .collect()
}

/// Issue items with ids in `ids`.
pub fn issues(ids: std::ops::Range<u64>) -> Vec<Value> {
    ids.map(|i| {
        json!({ "id": i, "issue_number": 1000 + i, "title": format!("Issue {}", i), "labels": ["bug"] })
    })
    .collect()
}

/// Stats body.
pub fn stats_body(docs: u64, packages: u64, issues: u64) -> Value {
    json!({ "total_docs": docs, "total_packages": packages, "total_issues": issues })
}
