//! The record store: the full branch list for this session.
//!
//! The list is read from the cache when one exists, otherwise fetched once
//! from the listing service and written to the cache. After that it only
//! changes through favourite toggles (each of which rewrites the cache in
//! full) or an explicit refresh.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, BranchSource};
use crate::cache::{CacheError, CacheManager, CachedData};
use crate::models::BankRecord;

/// City the listing service is queried for. The view filters locally.
pub const FETCH_CITY: &str = "MUMBAI";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to fetch branches: {0}")]
    Network(#[from] ApiError),

    #[error("Branch cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("No branch at position {index} (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No branch with IFSC {0}")]
    UnknownIfsc(String),
}

pub struct RecordStore {
    cache: CacheManager,
    records: Vec<BankRecord>,
    loaded: bool,
    cached_at: Option<DateTime<Utc>>,
    ttl: Duration,
}

impl RecordStore {
    pub fn new(cache: CacheManager, ttl: Duration) -> Self {
        Self {
            cache,
            records: Vec::new(),
            loaded: false,
            cached_at: None,
            ttl,
        }
    }

    pub fn records(&self) -> &[BankRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, index: usize) -> Option<&BankRecord> {
        self.records.get(index)
    }

    pub fn index_of(&self, ifsc: &str) -> Option<usize> {
        self.records.iter().position(|r| r.ifsc == ifsc)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load the store, from the cache if possible, else from `source`.
    ///
    /// Only the first successful call does any work; later calls return the
    /// in-memory list.
    pub async fn load<S: BranchSource>(&mut self, source: &S) -> Result<&[BankRecord], StoreError> {
        if self.loaded {
            return Ok(&self.records);
        }
        if self.load_cached()? {
            return Ok(&self.records);
        }
        let fetched = Self::fetch(source).await?;
        self.install_fetched(fetched)
    }

    /// Populate the store from the cache. Returns `false` on a cache miss.
    pub fn load_cached(&mut self) -> Result<bool, StoreError> {
        match self.cache.load_branches()? {
            Some(CachedData { data, cached_at }) => {
                info!(count = data.len(), "Loaded branches from cache");
                self.records = data;
                self.cached_at = Some(cached_at);
                self.loaded = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch a fresh list from `source`.
    ///
    /// Every record comes back as a non-favourite, and duplicate IFSC codes
    /// are dropped (first occurrence wins).
    pub async fn fetch<S: BranchSource>(source: &S) -> Result<Vec<BankRecord>, StoreError> {
        let fetched = source.fetch_branches(FETCH_CITY).await?;
        let total = fetched.len();

        let mut seen = HashSet::with_capacity(total);
        let records: Vec<BankRecord> = fetched
            .into_iter()
            .filter(|r| seen.insert(r.ifsc.clone()))
            .map(|mut r| {
                r.favourite = false;
                r
            })
            .collect();

        if records.len() != total {
            warn!(dropped = total - records.len(), "Dropped branches with duplicate IFSC codes");
        }
        Ok(records)
    }

    /// Install a list fetched for a first load, replacing whatever the store
    /// held. Favourites start out cleared.
    ///
    /// The in-memory list is replaced even when the cache write fails; the
    /// error is still returned.
    pub fn install_fetched(&mut self, mut records: Vec<BankRecord>) -> Result<&[BankRecord], StoreError> {
        for record in &mut records {
            record.favourite = false;
        }
        self.install(records)
    }

    /// Install a refreshed list. Favourite flags carry over by IFSC from the
    /// list being replaced; branches that are new to the list start out
    /// unmarked.
    pub fn install_refresh(&mut self, mut records: Vec<BankRecord>) -> Result<&[BankRecord], StoreError> {
        let favourites: HashSet<&str> = self
            .records
            .iter()
            .filter(|r| r.favourite)
            .map(|r| r.ifsc.as_str())
            .collect();
        for record in &mut records {
            record.favourite = favourites.contains(record.ifsc.as_str());
        }
        info!(
            count = records.len(),
            favourites = favourites.len(),
            "Installing refreshed branch list"
        );
        self.install(records)
    }

    fn install(&mut self, records: Vec<BankRecord>) -> Result<&[BankRecord], StoreError> {
        self.records = records;
        self.loaded = true;
        self.cached_at = Some(Utc::now());
        self.persist()?;
        Ok(&self.records)
    }

    // =========================================================================
    // Favourites
    // =========================================================================

    /// Set the favourite flag of the record at `index` and persist the store.
    ///
    /// The flag is updated in memory even if persisting fails.
    pub fn set_favourite(&mut self, index: usize, value: bool) -> Result<&[BankRecord], StoreError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;

        record.favourite = value;
        debug!(ifsc = %record.ifsc, value, "Favourite updated");

        self.persist()?;
        Ok(&self.records)
    }

    pub fn set_favourite_by_ifsc(&mut self, ifsc: &str, value: bool) -> Result<&[BankRecord], StoreError> {
        let index = self
            .index_of(ifsc)
            .ok_or_else(|| StoreError::UnknownIfsc(ifsc.to_string()))?;
        self.set_favourite(index, value)
    }

    /// Flip the favourite flag at `index`, returning the new value.
    pub fn toggle_favourite(&mut self, index: usize) -> Result<bool, StoreError> {
        let current = self
            .records
            .get(index)
            .map(|r| r.favourite)
            .ok_or(StoreError::IndexOutOfRange { index, len: self.records.len() })?;
        self.set_favourite(index, !current)?;
        Ok(!current)
    }

    pub fn favourite_count(&self) -> usize {
        self.records.iter().filter(|r| r.favourite).count()
    }

    // =========================================================================
    // Cache
    // =========================================================================

    /// Write the list back under the time it was fetched, so local edits
    /// do not make old data look fresh.
    fn persist(&self) -> Result<(), StoreError> {
        let cached_at = self.cached_at.unwrap_or_else(Utc::now);
        self.cache.save_branches_at(&self.records, cached_at)?;
        Ok(())
    }

    /// Human readable age of the data, `None` before the first load.
    pub fn cache_age(&self) -> Option<String> {
        self.cached_at.map(|at| {
            CachedData { data: (), cached_at: at }.age_display()
        })
    }

    pub fn is_stale(&self) -> bool {
        match self.cached_at {
            Some(at) => CachedData { data: (), cached_at: at }.is_stale(self.ttl),
            None => true,
        }
    }

    /// Drop the cache entry. The in-memory list is left alone.
    pub fn clear_cache(&self) -> Result<bool, StoreError> {
        Ok(self.cache.clear_branches()?)
    }
}

// ============================================================================
// Tests
// ============================================================================
