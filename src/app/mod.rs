//! Main application state and event handling.
//!
//! Owns the UI state (active tab, filters, input line) and drives the
//! [`DataService`] by spawning its operations on the tokio runtime. The
//! data itself lives in the service's store and is read once per frame.

mod input;

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossterm::event::{self, Event};
use ratatui::layout::Rect;
use ratatui::widgets::Clear;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::service::{DEFAULT_SEARCH_LIMIT, DataService, FetchQuery};
use crate::store::{LoadingKey, State};
use crate::ui::{
    DashboardView, FilterBar, HealthStatus, LayoutAreas, ResourceTable, SearchView, StatusBar,
    Tab, TabBar,
};

/// Event poll timeout in milliseconds.
const POLL_TIMEOUT_MS: u64 = 100;

/// Number of recent searches kept.
pub const SEARCH_HISTORY_LEN: usize = 5;

/// Whether keys go to the app or to the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys are commands.
    #[default]
    Normal,
    /// Keys edit the filter or search text.
    Editing,
}

/// Application state.
pub struct App {
    /// Data operations and the shared store.
    service: DataService,
    /// Runtime the operations are spawned on.
    runtime: Handle,
    /// Active tab.
    tab: Tab,
    /// Current input mode.
    input_mode: InputMode,
    /// Text being edited.
    edit_buffer: String,
    /// Docs search term.
    docs_filter: String,
    /// Packages search term.
    packages_filter: String,
    /// Issue label filter.
    issue_labels: String,
    /// Last submitted search query.
    search_query: String,
    /// Recent searches, newest first.
    search_history: Vec<String>,
    /// Scroll offset per tab.
    scroll: [usize; Tab::ALL.len()],
    /// Page size for table fetches.
    page_size: u32,
    /// Last observed API health.
    health: Arc<Mutex<HealthStatus>>,
    /// Running flag.
    running: bool,
    /// Status message.
    status: String,
}

impl App {
    /// Creates a new application.
    #[must_use]
    pub fn new(service: DataService, runtime: Handle, page_size: u32) -> Self {
        assert!(page_size > 0, "Page size must be positive");

        Self {
            service,
            runtime,
            tab: Tab::Dashboard,
            input_mode: InputMode::Normal,
            edit_buffer: String::new(),
            docs_filter: String::new(),
            packages_filter: String::new(),
            issue_labels: String::new(),
            search_query: String::new(),
            search_history: Vec::new(),
            scroll: [0; Tab::ALL.len()],
            page_size,
            health: Arc::new(Mutex::new(HealthStatus::Unknown)),
            running: true,
            status: String::new(),
        }
    }

    /// Kicks off the initial load and the first health check.
    pub fn start(&mut self) {
        info!("[APP] Starting initial load");
        let service = self.service.clone();
        self.spawn(async move { service.load_initial().await });
        self.check_health();
    }

    /// Returns the data service.
    #[must_use]
    pub fn service(&self) -> &DataService {
        &self.service
    }

    /// Returns true if the application is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the application.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Returns the active tab.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    /// Switches to `tab`.
    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            debug!("[APP] tab {:?} -> {:?}", self.tab, tab);
            self.tab = tab;
            self.input_mode = InputMode::Normal;
        }
    }

    /// Returns the input mode.
    #[must_use]
    pub const fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Returns the text being edited.
    #[must_use]
    pub fn edit_buffer(&self) -> &str {
        &self.edit_buffer
    }

    /// Returns recent searches, newest first.
    #[must_use]
    pub fn search_history(&self) -> &[String] {
        &self.search_history
    }

    /// Returns the committed filter text for `tab`.
    #[must_use]
    pub fn filter_for(&self, tab: Tab) -> &str {
        match tab {
            Tab::Docs => &self.docs_filter,
            Tab::Packages => &self.packages_filter,
            Tab::Issues => &self.issue_labels,
            Tab::Search => &self.search_query,
            Tab::Dashboard => "",
        }
    }

    fn filter_mut(&mut self, tab: Tab) -> Option<&mut String> {
        match tab {
            Tab::Docs => Some(&mut self.docs_filter),
            Tab::Packages => Some(&mut self.packages_filter),
            Tab::Issues => Some(&mut self.issue_labels),
            Tab::Search => Some(&mut self.search_query),
            Tab::Dashboard => None,
        }
    }

    /// Returns the last observed API health.
    #[must_use]
    pub fn health(&self) -> HealthStatus {
        self.health
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the status message.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Sets the status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.runtime.spawn(future));
    }

    /// Refetches the active tab, bypassing the cache.
    pub fn refresh(&mut self) {
        let service = self.service.clone();
        let query = FetchQuery::new()
            .limit(self.page_size)
            .filter(self.filter_for(self.tab))
            .use_cache(false);

        match self.tab {
            Tab::Dashboard => self.spawn(async move { service.fetch_stats(false).await }),
            Tab::Docs => self.spawn(async move { service.fetch_docs(query).await }),
            Tab::Packages => self.spawn(async move { service.fetch_packages(query).await }),
            Tab::Issues => self.spawn(async move { service.fetch_issues(query).await }),
            Tab::Search => {
                let q = self.search_query.clone();
                if !q.is_empty() {
                    self.spawn(async move { service.search_all(&q, DEFAULT_SEARCH_LIMIT).await });
                }
            }
        }
        self.set_status(format!("Refreshing {}", self.tab.title()));
    }

    /// Fetches the first page of the active table with its filter.
    ///
    /// Unfiltered first pages are served from cache when fresh.
    fn apply_filter(&mut self) {
        let service = self.service.clone();
        let query = FetchQuery::new()
            .limit(self.page_size)
            .filter(self.filter_for(self.tab));
        self.scroll[self.tab.index()] = 0;

        match self.tab {
            Tab::Docs => self.spawn(async move { service.fetch_docs(query).await }),
            Tab::Packages => self.spawn(async move { service.fetch_packages(query).await }),
            Tab::Issues => self.spawn(async move { service.fetch_issues(query).await }),
            Tab::Dashboard | Tab::Search => {}
        }
    }

    /// Appends the next page of the active table.
    pub fn load_more(&mut self) {
        let service = self.service.clone();
        let limit = self.page_size;
        let filter = self.filter_for(self.tab).to_string();

        match self.tab {
            Tab::Docs => self.spawn(async move { service.fetch_more_docs(limit, &filter).await }),
            Tab::Packages => {
                self.spawn(async move { service.fetch_more_packages(limit, &filter).await });
            }
            Tab::Issues => {
                self.spawn(async move { service.fetch_more_issues(limit, &filter).await });
            }
            Tab::Dashboard | Tab::Search => {}
        }
    }

    /// Runs a full sync, then re-checks health.
    pub fn sync(&mut self) {
        if self.service.store().read(|s| s.is_loading(LoadingKey::Sync)) {
            self.set_status("Sync already running");
            return;
        }
        let service = self.service.clone();
        let health = Arc::clone(&self.health);
        self.spawn(async move {
            service.trigger_sync().await;
            update_health(&service, &health).await;
        });
        self.set_status("Syncing");
    }

    /// Checks API health in the background.
    pub fn check_health(&mut self) {
        let service = self.service.clone();
        let health = Arc::clone(&self.health);
        self.spawn(async move { update_health(&service, &health).await });
    }

    /// Searches all kinds and records the query in the history.
    pub fn search(&mut self, query: &str) {
        let query = query.trim().to_string();
        if !query.is_empty() {
            push_history(&mut self.search_history, &query);
        }
        self.search_query.clone_from(&query);
        self.scroll[Tab::Search.index()] = 0;

        let service = self.service.clone();
        self.spawn(async move { service.search_all(&query, DEFAULT_SEARCH_LIMIT).await });
    }

    /// Clears the error slot.
    pub fn clear_error(&mut self) {
        self.service.clear_error();
    }

    /// Processes pending terminal events.
    ///
    /// # Errors
    /// Returns error if reading terminal events fails.
    pub fn update(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Renders the application.
    pub fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let state = self.service.store().snapshot();
        let areas = LayoutAreas::compute(area, self.shows_filter());

        frame.render_widget(
            TabBar::new(self.tab).busy(state.loading.any()),
            areas.tab_bar,
        );

        if let Some(filter_area) = areas.filter {
            self.render_filter(frame, filter_area);
        }

        self.render_body(frame, &state, areas.body);

        frame.render_widget(
            StatusBar::new()
                .error(state.error.as_deref())
                .message(&self.status)
                .loading(state.loading)
                .editing(self.input_mode == InputMode::Editing),
            areas.status_bar,
        );
    }

    fn shows_filter(&self) -> bool {
        matches!(self.tab, Tab::Docs | Tab::Packages | Tab::Issues)
    }

    /// Text shown in the input line: the edit buffer while editing.
    fn visible_input(&self) -> &str {
        if self.input_mode == InputMode::Editing {
            &self.edit_buffer
        } else {
            self.filter_for(self.tab)
        }
    }

    fn render_filter(&self, frame: &mut ratatui::Frame, area: Rect) {
        let label = match self.tab {
            Tab::Issues => "Labels (comma separated)",
            Tab::Packages => "Search packages",
            _ => "Search docs",
        };
        frame.render_widget(
            FilterBar::new(label, self.visible_input())
                .editing(self.input_mode == InputMode::Editing),
            area,
        );
    }

    fn render_body(&self, frame: &mut ratatui::Frame, state: &State, area: Rect) {
        let scroll = self.scroll[self.tab.index()];
        match self.tab {
            Tab::Dashboard => {
                let health = self.health();
                frame.render_widget(DashboardView::new(state, &health), area);
            }
            Tab::Docs => frame.render_widget(
                ResourceTable::new(&state.docs)
                    .filter(self.visible_input())
                    .scroll(scroll)
                    .loading(state.is_loading(LoadingKey::Docs))
                    .has_more(state.cursors.docs.has_more),
                area,
            ),
            Tab::Packages => frame.render_widget(
                ResourceTable::new(&state.packages)
                    .filter(self.visible_input())
                    .scroll(scroll)
                    .loading(state.is_loading(LoadingKey::Packages))
                    .has_more(state.cursors.packages.has_more),
                area,
            ),
            // Labels are filtered server-side.
            Tab::Issues => frame.render_widget(
                ResourceTable::new(&state.issues)
                    .scroll(scroll)
                    .loading(state.is_loading(LoadingKey::Issues))
                    .has_more(state.cursors.issues.has_more),
                area,
            ),
            Tab::Search => frame.render_widget(
                SearchView::new(self.visible_input())
                    .editing(self.input_mode == InputMode::Editing)
                    .results(state.search_results.as_ref())
                    .history(&self.search_history)
                    .loading(state.is_loading(LoadingKey::Search))
                    .scroll(u16::try_from(scroll).unwrap_or(u16::MAX)),
                area,
            ),
        }
    }
}

/// Records `query` as the newest search, keeping each query once.
fn push_history(history: &mut Vec<String>, query: &str) {
    history.retain(|q| q != query);
    history.insert(0, query.to_string());
    history.truncate(SEARCH_HISTORY_LEN);
}

async fn update_health(service: &DataService, health: &Mutex<HealthStatus>) {
    set_health(health, HealthStatus::Checking);
    let status = match service.check_health().await {
        Ok(h) => {
            info!("[HEALTH] status={} version={:?}", h.status, h.version);
            HealthStatus::Healthy(h)
        }
        Err(e) => HealthStatus::Down(e.to_string()),
    };
    set_health(health, status);
}

fn set_health(health: &Mutex<HealthStatus>, status: HealthStatus) {
    *health.lock().unwrap_or_else(PoisonError::into_inner) = status;
}
