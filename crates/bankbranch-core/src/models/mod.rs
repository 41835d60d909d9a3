//! Data models for bank branch listings.
//!
//! - `BankRecord`: one branch as returned by the listing service, plus the
//!   locally tracked favourite flag
//! - `City`: the fixed set of cities the browser can filter on

pub mod bank;
pub mod city;

pub use bank::BankRecord;
pub use city::City;
