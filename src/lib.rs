//! FlutterLens
//!
//! A terminal dashboard over the FlutterLens REST API: Flutter
//! documentation, pub.dev packages and flutter/flutter issues.
//!
//! # Architecture
//!
//! - **API Module**: async HTTP client, response types and error classification
//! - **Store Module**: reducer-driven state container with per-kind TTL cache
//! - **Service Module**: fetch, search, sync and health operations
//! - **UI Module**: Ratatui widgets for the dashboard tabs
//! - **App Module**: event loop state and key handling
//!
//! # Usage
//!
//! ```no_run
//! use flutterlens::config::Config;
//! use flutterlens::service::DataService;
//! use flutterlens::store::Store;
//!
//! # async fn run() {
//! let config = Config::load().unwrap_or_default();
//! let service = DataService::new(config.api_client(None), Store::new(config.ttls));
//! service.load_initial().await;
//! # }
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::unnested_or_patterns)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod service;
pub mod store;
pub mod ui;

/// Current version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types
pub use api::{ApiClient, ApiError};
pub use app::App;
pub use config::Config;
pub use service::DataService;
pub use store::{Action, State, Store};
