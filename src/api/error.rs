//! API error classification.
//!
//! Each variant is a failure class; its `Display` output is the message
//! shown in the dashboard error slot.

use serde_json::Value;
use thiserror::Error;

/// Message used when an unexpected error carries no text of its own.
const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Message for an empty search query.
pub const EMPTY_QUERY_MESSAGE: &str = "Search query cannot be empty";

/// Errors returned by [`ApiClient`](super::ApiClient) calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 429.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// HTTP 5xx.
    #[error("Server error. Please try again later.")]
    Server { status: u16 },

    /// HTTP 404.
    #[error("Resource not found.")]
    NotFound,

    /// Any other non-success HTTP status.
    #[error("{}", http_message(.status, .detail))]
    Http { status: u16, detail: Option<String> },

    /// No response was received (connect failure, timeout).
    #[error("Network error. Please check your connection.")]
    Network { reason: String },

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Anything else, such as an undecodable body.
    #[error("{}", unexpected_message(.0))]
    Unexpected(Option<String>),
}

/// Fieldless failure class, for matching without caring about payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RateLimited,
    Server,
    NotFound,
    Http,
    Network,
    Validation,
    Unexpected,
}

impl ApiError {
    /// Classifies a non-success HTTP response.
    ///
    /// `body` is the decoded response body, if it was JSON.
    #[must_use]
    pub fn from_status(status: u16, body: Option<&Value>) -> Self {
        match status {
            429 => Self::RateLimited,
            s if s >= 500 => Self::Server { status: s },
            404 => Self::NotFound,
            s => Self::Http {
                status: s,
                detail: body.and_then(server_detail),
            },
        }
    }

    /// Classifies a transport-level reqwest error.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Unexpected(Some(err.to_string()));
        }
        // Every other send error means no HTTP response arrived.
        Self::Network {
            reason: err.to_string(),
        }
    }

    /// Builds the error for an empty search query.
    #[must_use]
    pub fn empty_query() -> Self {
        Self::Validation(EMPTY_QUERY_MESSAGE.to_string())
    }

    /// Returns the failure class.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Server { .. } => ErrorKind::Server,
            Self::NotFound => ErrorKind::NotFound,
            Self::Http { .. } => ErrorKind::Http,
            Self::Network { .. } => ErrorKind::Network,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Extracts the server-supplied `detail` or `message` field.
fn server_detail(body: &Value) -> Option<String> {
    ["detail", "message"]
        .into_iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn http_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!("Request failed with status {}", status),
    }
}

fn unexpected_message(message: &Option<String>) -> String {
    message
        .clone()
        .unwrap_or_else(|| UNEXPECTED_MESSAGE.to_string())
}
