//! Cache module for persisting the last known rate table
//!
//! `CacheManager` is a small string-keyed store backed by files in an
//! XDG-compliant cache directory. `RateCache` sits on top of it and keeps one
//! rate table plus the time it was fetched. Unreadable or malformed entries
//! are treated as a cache miss.

mod manager;
mod rates;

pub use manager::CacheManager;
pub use rates::{CacheEntry, RateCache, LAST_UPDATE_KEY, RATES_KEY};
