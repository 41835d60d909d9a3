//! View projection: the filtered, paginated slice of the store on screen.
//!
//! Everything here is a pure function of the store and a `ViewState`. All
//! active filters are combined (city AND search AND favourites) and the
//! projection is recomputed from the full store on every change, so no
//! filter ever hides the effect of another.
//!
//! Rows carry their position in the store (`Indexed::index`), which is what
//! favourite toggles are addressed by.

use std::ops::RangeInclusive;

use crate::models::{BankRecord, City};

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// A record together with its position in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indexed<'a> {
    pub index: usize,
    pub record: &'a BankRecord,
}

/// Tag every record with its store position.
pub fn index(store: &[BankRecord]) -> Vec<Indexed<'_>> {
    store
        .iter()
        .enumerate()
        .map(|(index, record)| Indexed { index, record })
        .collect()
}

// ============================================================================
// Filters
// ============================================================================

/// Records whose city equals `city`, ignoring case.
pub fn apply_city_filter<'a>(records: &[Indexed<'a>], city: &str) -> Vec<Indexed<'a>> {
    records.iter().copied().filter(|r| r.record.in_city(city)).collect()
}

/// Records with at least one attribute containing `text`, ignoring case.
/// Empty `text` keeps everything.
pub fn apply_text_search<'a>(records: &[Indexed<'a>], text: &str) -> Vec<Indexed<'a>> {
    if text.is_empty() {
        return records.to_vec();
    }
    let needle = text.to_lowercase();
    records
        .iter()
        .copied()
        .filter(|r| r.record.matches_text(&needle))
        .collect()
}

/// Only favourites when `favourites_only`, else everything.
pub fn apply_favourites_filter<'a>(records: &[Indexed<'a>], favourites_only: bool) -> Vec<Indexed<'a>> {
    if !favourites_only {
        return records.to_vec();
    }
    records.iter().copied().filter(|r| r.record.favourite).collect()
}

// ============================================================================
// Pagination
// ============================================================================

/// The 1-based `page` of `results`, `page_size` items long.
///
/// Pages past the end, page 0 and a zero page size all give an empty slice.
pub fn paginate<T>(results: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = match (page - 1).checked_mul(page_size) {
        Some(start) if start < results.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(results.len());
    &results[start..end]
}

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Page numbers shown by the pagination control: at most `range` pages
/// around `active`, shifted so the window never runs past either end.
pub fn page_window(active: usize, pages: usize, range: usize) -> RangeInclusive<usize> {
    if pages == 0 || range == 0 {
        return 1..=0;
    }
    let start = active.saturating_sub(range / 2).max(1);
    let end = start.saturating_add(range - 1).min(pages);
    let start = end.saturating_sub(range - 1).max(1);
    start..=end
}

// ============================================================================
// View State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub city_filter: City,
    pub search_text: String,
    pub items_per_page: usize,
    /// 1-based
    pub active_page: usize,
    pub favourites_only: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            city_filter: City::Mumbai,
            search_text: String::new(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            active_page: 1,
            favourites_only: false,
        }
    }
}

impl ViewState {
    pub fn new(city: City, items_per_page: usize) -> Self {
        Self {
            city_filter: city,
            items_per_page: items_per_page.max(1),
            ..Self::default()
        }
    }

    pub fn set_city(&mut self, city: City) {
        self.city_filter = city;
        self.active_page = 1;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.active_page = 1;
    }

    pub fn set_favourites_only(&mut self, favourites_only: bool) {
        self.favourites_only = favourites_only;
        self.active_page = 1;
    }

    /// Change the page size. Zero is rejected and leaves the state alone.
    pub fn set_items_per_page(&mut self, items_per_page: usize) -> bool {
        if items_per_page == 0 {
            return false;
        }
        self.items_per_page = items_per_page;
        self.active_page = 1;
        true
    }

    /// Jump to `page`. Out-of-range pages are allowed and display empty.
    pub fn set_page(&mut self, page: usize) {
        self.active_page = page.max(1);
    }

    pub fn next_page(&mut self, total: usize) {
        if self.active_page < page_count(total, self.items_per_page) {
            self.active_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.active_page = self.active_page.saturating_sub(1).max(1);
    }

    pub fn last_page(&mut self, total: usize) {
        self.active_page = page_count(total, self.items_per_page).max(1);
    }

    /// Pull the active page back into `1..=page_count` for `total` matches.
    pub fn clamp_page(&mut self, total: usize) {
        let pages = page_count(total, self.items_per_page).max(1);
        self.active_page = self.active_page.clamp(1, pages);
    }
}

// ============================================================================
// Projection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<'a> {
    /// Rows on the active page
    pub rows: Vec<Indexed<'a>>,
    /// Matches across all pages
    pub total_matches: usize,
    pub page_count: usize,
    pub active_page: usize,
}

/// Records in `store` matching every active filter of `state`.
pub fn filter<'a>(store: &'a [BankRecord], state: &ViewState) -> Vec<Indexed<'a>> {
    let all = index(store);
    let by_city = apply_city_filter(&all, state.city_filter.key());
    let by_text = apply_text_search(&by_city, &state.search_text);
    apply_favourites_filter(&by_text, state.favourites_only)
}

pub fn project<'a>(store: &'a [BankRecord], state: &ViewState) -> Projection<'a> {
    let matches = filter(store, state);
    let rows = paginate(&matches, state.active_page, state.items_per_page).to_vec();

    Projection {
        total_matches: matches.len(),
        page_count: page_count(matches.len(), state.items_per_page),
        active_page: state.active_page,
        rows,
    }
}

// ============================================================================
// Tests
// ============================================================================
