//! Core library for bankbranch.
//!
//! Everything that does not depend on a particular front end lives here:
//!
//! - `models`: `BankRecord` and the fixed `City` options
//! - `api`: HTTP client for the branch listing service
//! - `cache`: JSON file cache with freshness tracking
//! - `store`: the `RecordStore` (load once, toggle favourites, refresh)
//! - `view`: pure filtering and pagination over the store
//! - `config`: user configuration and directory resolution

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError, BranchSource};
pub use cache::{CacheError, CacheManager};
pub use config::Config;
pub use models::{BankRecord, City};
pub use store::{RecordStore, StoreError};
pub use view::{Indexed, Projection, ViewState};
