//! Local caching module for offline data access.
//!
//! This module provides the `CacheManager` for storing and retrieving the
//! branch list locally. Data is cached as JSON together with the time it
//! was written, so callers can report its age and decide when it is stale.

pub mod manager;

pub use manager::{CacheError, CacheManager, CachedData};
