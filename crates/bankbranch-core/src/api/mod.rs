//! REST API client module for the bank branch listing service.
//!
//! This module provides the `ApiClient` for fetching branch listings and
//! the `BranchSource` trait the record store fetches through, so the store
//! can be driven by something other than the network.

pub mod client;
pub mod error;

use std::future::Future;

use crate::models::BankRecord;

pub use client::ApiClient;
pub use error::ApiError;

/// A source of bank branch listings.
pub trait BranchSource: Send + Sync {
    /// Fetch every branch the service lists for `city`.
    fn fetch_branches(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<Vec<BankRecord>, ApiError>> + Send;
}
