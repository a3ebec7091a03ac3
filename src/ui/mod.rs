//! User interface module.
//!
//! Provides widgets and layout for the dashboard TUI. Widgets render from
//! a [`crate::store::State`] snapshot and never touch the store directly.

pub mod dashboard;
pub mod format;
pub mod layout;
pub mod search;
pub mod statusbar;
pub mod tables;
pub mod tabs;

pub use dashboard::{DashboardView, HealthStatus};
pub use layout::{FilterBar, LayoutAreas};
pub use search::SearchView;
pub use statusbar::StatusBar;
pub use tables::{ResourceTable, TableRow};
pub use tabs::{Tab, TabBar};
