//! Application state management for bankbranch.
//!
//! This module contains the core `App` struct: the record store, the view
//! state the user manipulates, and the background fetch coordination.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use bankbranch_core::models::BankRecord;
use bankbranch_core::view::{self, Projection, ViewState};
use bankbranch_core::{ApiClient, CacheManager, Config, RecordStore};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

/// Maximum digits accepted in the items-per-page input.
const MAX_PAGE_SIZE_DIGITS: usize = 4;

/// Maximum length of the search query.
const MAX_SEARCH_LENGTH: usize = 64;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    EditingPageSize,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Where the branch list stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from the background fetch task.
enum LoadResult {
    /// First load from the network (cache was empty or unusable)
    Loaded(Vec<BankRecord>),
    /// Explicit refresh; favourites carry over
    Refreshed(Vec<BankRecord>),
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub api: ApiClient,
    pub store: RecordStore,
    pub view: ViewState,

    pub state: AppState,
    pub load_state: LoadState,
    /// Selected row within the active page
    pub selection: usize,
    pub page_size_input: String,
    pub status_message: Option<String>,
    fetch_in_flight: bool,

    load_rx: mpsc::Receiver<LoadResult>,
    load_tx: mpsc::Sender<LoadResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        let cache = CacheManager::new(cache_dir)?;
        let store = RecordStore::new(cache, config.cache_ttl());
        let api = ApiClient::new(&config.api_base_url)?;
        let view = ViewState::new(config.default_city, config.items_per_page);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            api,
            store,
            view,

            state: AppState::Normal,
            load_state: LoadState::Loading,
            selection: 0,
            page_size_input: String::new(),
            status_message: None,
            fetch_in_flight: false,

            load_rx: rx,
            load_tx: tx,
        })
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load from the cache, or start a background fetch on a miss.
    pub fn start_load(&mut self) {
        match self.store.load_cached() {
            Ok(true) => {
                self.load_state = LoadState::Ready;
                if self.store.is_stale() {
                    self.status_message =
                        Some("Branch list is stale - press [u] to update".to_string());
                }
            }
            Ok(false) => self.spawn_fetch(false),
            Err(e) => {
                warn!(error = %e, "Cached branch list unusable");
                self.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    /// Retry after a failed load. Goes straight to the network, since the
    /// cache is either empty or unreadable at this point.
    pub fn retry_load(&mut self) {
        if matches!(self.load_state, LoadState::Failed(_)) {
            self.spawn_fetch(false);
        }
    }

    /// Explicit refresh of an already loaded list.
    pub fn refresh(&mut self) {
        if self.load_state == LoadState::Ready {
            self.spawn_fetch(true);
        }
    }

    fn spawn_fetch(&mut self, refresh: bool) {
        if self.fetch_in_flight {
            return;
        }
        self.fetch_in_flight = true;

        if refresh {
            self.status_message = Some("Updating branch list...".to_string());
        } else {
            self.load_state = LoadState::Loading;
        }

        let api = self.api.clone();
        let tx = self.load_tx.clone();

        tokio::spawn(async move {
            let result = match RecordStore::fetch(&api).await {
                Ok(records) if refresh => LoadResult::Refreshed(records),
                Ok(records) => LoadResult::Loaded(records),
                Err(e) => {
                    error!(error = %e, "Branch fetch failed");
                    LoadResult::Error(e.to_string())
                }
            };
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Failed to send load result - channel closed");
            }
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.load_rx.try_recv() {
            self.process_load_result(result);
        }
    }

    fn process_load_result(&mut self, result: LoadResult) {
        self.fetch_in_flight = false;
        match result {
            LoadResult::Loaded(records) => {
                info!(count = records.len(), "Branch list loaded");
                if let Err(e) = self.store.install_fetched(records) {
                    warn!(error = %e, "Failed to cache branch list");
                    self.status_message = Some(format!("Not cached: {}", e));
                }
                self.load_state = LoadState::Ready;
                self.after_view_change();
            }
            LoadResult::Refreshed(records) => {
                let count = records.len();
                match self.store.install_refresh(records) {
                    Ok(_) => self.status_message = Some(format!("Updated {} branches", count)),
                    Err(e) => {
                        warn!(error = %e, "Failed to cache refreshed branch list");
                        self.status_message = Some(format!("Updated, but not cached: {}", e));
                    }
                }
                self.after_view_change();
            }
            LoadResult::Error(message) => {
                if self.load_state == LoadState::Ready {
                    self.status_message = Some(format!("Update failed: {}", message));
                } else {
                    self.load_state = LoadState::Failed(message);
                }
            }
        }
    }

    /// Drop the one-shot status message so the summary shows again.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // =========================================================================
    // Projection
    // =========================================================================

    pub fn projection(&self) -> Projection<'_> {
        view::project(self.store.records(), &self.view)
    }

    fn total_matches(&self) -> usize {
        view::filter(self.store.records(), &self.view).len()
    }

    /// Keep the page and the row selection inside the current results.
    fn after_view_change(&mut self) {
        let total = self.total_matches();
        self.view.clamp_page(total);
        let rows = self.projection().rows.len();
        self.selection = self.selection.min(rows.saturating_sub(1));
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn next_city(&mut self) {
        self.view.set_city(self.view.city_filter.next());
        self.selection = 0;
        self.after_view_change();
    }

    pub fn prev_city(&mut self) {
        self.view.set_city(self.view.city_filter.prev());
        self.selection = 0;
        self.after_view_change();
    }

    pub fn push_search_char(&mut self, c: char) {
        if self.view.search_text.chars().count() >= MAX_SEARCH_LENGTH || c.is_control() {
            return;
        }
        let mut text = self.view.search_text.clone();
        text.push(c);
        self.set_search(&text);
    }

    pub fn pop_search_char(&mut self) {
        let mut text = self.view.search_text.clone();
        text.pop();
        self.set_search(&text);
    }

    pub fn set_search(&mut self, text: &str) {
        self.view.set_search(text);
        self.selection = 0;
        self.after_view_change();
    }

    pub fn toggle_favourites_only(&mut self) {
        self.view.set_favourites_only(!self.view.favourites_only);
        self.selection = 0;
        self.after_view_change();
    }

    // =========================================================================
    // Favourites
    // =========================================================================

    /// Store index of the selected row, if any.
    pub fn selected_index(&self) -> Option<usize> {
        self.projection().rows.get(self.selection).map(|r| r.index)
    }

    pub fn toggle_selected_favourite(&mut self) {
        if self.load_state != LoadState::Ready || self.fetch_in_flight {
            return;
        }
        let Some(index) = self.selected_index() else {
            return;
        };

        if let Err(e) = self.store.toggle_favourite(index) {
            warn!(error = %e, index, "Failed to save favourite");
            self.status_message = Some(format!("Favourite not saved: {}", e));
        }
        // With "favourites only" on, unmarking removes the row from view
        self.after_view_change();
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn next_page(&mut self) {
        let total = self.total_matches();
        self.view.next_page(total);
        self.selection = 0;
    }

    pub fn prev_page(&mut self) {
        self.view.prev_page();
        self.selection = 0;
    }

    pub fn first_page(&mut self) {
        self.view.set_page(1);
        self.selection = 0;
    }

    pub fn last_page(&mut self) {
        let total = self.total_matches();
        self.view.last_page(total);
        self.selection = 0;
    }

    pub fn select_next(&mut self) {
        let rows = self.projection().rows.len();
        if self.selection + 1 < rows {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn start_page_size_edit(&mut self) {
        self.page_size_input = self.view.items_per_page.to_string();
        self.state = AppState::EditingPageSize;
    }

    pub fn push_page_size_digit(&mut self, c: char) {
        if c.is_ascii_digit() && self.page_size_input.len() < MAX_PAGE_SIZE_DIGITS {
            self.page_size_input.push(c);
        }
    }

    /// Apply the typed page size. Returns false (and keeps editing) when the
    /// input is not a positive number.
    pub fn apply_page_size(&mut self) -> bool {
        match self.page_size_input.parse::<usize>() {
            Ok(size) if self.view.set_items_per_page(size) => {
                self.selection = 0;
                self.after_view_change();
                self.state = AppState::Normal;
                true
            }
            _ => {
                self.status_message = Some("Items per page must be a positive number".to_string());
                false
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bankbranch_core::models::City;
    use tempfile::TempDir;

    fn record(ifsc: &str, city: &str) -> BankRecord {
        BankRecord {
            ifsc: ifsc.to_string(),
            bank_id: 1,
            branch: format!("{} BRANCH", ifsc),
            address: "MG ROAD".to_string(),
            city: city.to_string(),
            district: city.to_uppercase(),
            state: "STATE".to_string(),
            bank_name: "TEST BANK".to_string(),
            favourite: false,
        }
    }

    fn test_app(dir: &TempDir) -> App {
        let config = Config::default()
            .with_env_overrides(None, Some(dir.path().display().to_string()));
        App::new(config).unwrap()
    }

    fn loaded_app(dir: &TempDir, records: Vec<BankRecord>) -> App {
        let mut app = test_app(dir);
        app.process_load_result(LoadResult::Loaded(records));
        app
    }

    fn mumbai_branches(n: usize) -> Vec<BankRecord> {
        (0..n).map(|i| record(&format!("M{:03}", i), "MUMBAI")).collect()
    }

    #[test]
    fn test_new_app_defaults() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        assert_eq!(app.load_state, LoadState::Loading);
        assert_eq!(app.view.city_filter, City::Mumbai);
        assert_eq!(app.view.items_per_page, 10);
        assert_eq!(app.view.active_page, 1);
    }

    #[test]
    fn test_start_load_from_cache() {
        let dir = TempDir::new().unwrap();
        CacheManager::new(dir.path().to_path_buf())
            .unwrap()
            .save_branches(&mumbai_branches(3))
            .unwrap();

        let mut app = test_app(&dir);
        app.start_load();
        assert_eq!(app.load_state, LoadState::Ready);
        assert_eq!(app.projection().total_matches, 3);
    }

    #[test]
    fn test_malformed_cache_surfaces_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("branches.json"), "garbage").unwrap();

        let mut app = test_app(&dir);
        app.start_load();
        assert!(matches!(app.load_state, LoadState::Failed(_)));
    }

    #[test]
    fn test_fetch_error_before_load_is_failure() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.process_load_result(LoadResult::Error("timed out".to_string()));
        assert_eq!(app.load_state, LoadState::Failed("timed out".to_string()));
    }

    #[test]
    fn test_fetch_error_after_load_keeps_data() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_app(&dir, mumbai_branches(2));
        app.process_load_result(LoadResult::Error("timed out".to_string()));
        assert_eq!(app.load_state, LoadState::Ready);
        assert!(app.status_message.as_deref().unwrap().contains("timed out"));
        assert_eq!(app.store.len(), 2);
    }

    #[test]
    fn test_toggle_selected_favourite_uses_store_index() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record("D1", "DELHI"),
            record("M1", "MUMBAI"),
            record("D2", "DELHI"),
            record("M2", "MUMBAI"),
        ];
        let mut app = loaded_app(&dir, records);

        // Mumbai view shows M1 (store index 1) and M2 (store index 3)
        app.select_next();
        assert_eq!(app.selected_index(), Some(3));
        app.toggle_selected_favourite();
        assert!(app.store.get(3).unwrap().favourite);
        assert!(!app.store.get(1).unwrap().favourite);
    }

    #[test]
    fn test_unfavouriting_in_favourites_view_clamps_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_app(&dir, mumbai_branches(3));
        app.store.set_favourite(0, true).unwrap();
        app.store.set_favourite(2, true).unwrap();

        app.toggle_favourites_only();
        assert_eq!(app.projection().total_matches, 2);

        app.select_next();
        app.toggle_selected_favourite();
        assert_eq!(app.projection().total_matches, 1);
        assert_eq!(app.selection, 0);
    }

    #[test]
    fn test_refresh_keeps_favourites() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_app(&dir, mumbai_branches(2));
        app.toggle_selected_favourite();

        app.process_load_result(LoadResult::Refreshed(mumbai_branches(3)));
        assert_eq!(app.store.len(), 3);
        assert!(app.store.get(0).unwrap().favourite);
        assert_eq!(app.store.favourite_count(), 1);
    }

    #[test]
    fn test_search_and_city_combine() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_app(
            &dir,
            vec![record("M1", "MUMBAI"), record("M2", "MUMBAI"), record("D1", "DELHI")],
        );

        for c in "m2".chars() {
            app.push_search_char(c);
        }
        assert_eq!(app.projection().total_matches, 1);

        app.next_city();
        assert_eq!(app.view.city_filter, City::Delhi);
        assert_eq!(app.projection().total_matches, 0);

        app.pop_search_char();
        app.pop_search_char();
        assert_eq!(app.projection().total_matches, 1);
    }

    #[test]
    fn test_paging_and_page_size() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_app(&dir, mumbai_branches(25));

        app.last_page();
        assert_eq!(app.view.active_page, 3);
        assert_eq!(app.projection().rows.len(), 5);

        app.next_page();
        assert_eq!(app.view.active_page, 3);

        app.start_page_size_edit();
        app.page_size_input.clear();
        app.push_page_size_digit('0');
        assert!(!app.apply_page_size());
        assert_eq!(app.state, AppState::EditingPageSize);

        app.page_size_input.clear();
        app.push_page_size_digit('x');
        app.push_page_size_digit('5');
        assert!(app.apply_page_size());
        assert_eq!(app.view.items_per_page, 5);
        assert_eq!(app.projection().page_count, 5);
        assert_eq!(app.state, AppState::Normal);
    }
}
