//! Persisted rate table and fetch timestamp

use chrono::{DateTime, Utc};
use std::io;
use tracing::{debug, warn};

use super::CacheManager;
use crate::data::RateTable;

/// Cache key holding the serialized rate table
pub const RATES_KEY: &str = "rates.json";

/// Cache key holding the RFC 3339 timestamp of the last successful fetch
pub const LAST_UPDATE_KEY: &str = "last_update";

/// The last successfully fetched table and when it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub table: RateTable,
    pub fetched_at: DateTime<Utc>,
}

/// Rate cache backed by a `CacheManager`
///
/// Without a manager the cache is disabled: nothing loads and stores are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct RateCache {
    manager: Option<CacheManager>,
}

impl RateCache {
    pub fn new(manager: Option<CacheManager>) -> Self {
        Self { manager }
    }

    /// A cache that never holds anything
    pub fn disabled() -> Self {
        Self { manager: None }
    }

    pub fn manager(&self) -> Option<&CacheManager> {
        self.manager.as_ref()
    }

    /// Reads the persisted entry
    ///
    /// Returns `None` if either part is missing or fails to parse.
    pub fn load(&self) -> Option<CacheEntry> {
        let manager = self.manager.as_ref()?;
        let raw_table = manager.get(RATES_KEY)?;
        let raw_timestamp = manager.get(LAST_UPDATE_KEY)?;

        let table = match serde_json::from_str::<RateTable>(&raw_table) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed cached rates");
                return None;
            }
        };

        let fetched_at = match DateTime::parse_from_rfc3339(raw_timestamp.trim()) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                warn!(error = %e, value = %raw_timestamp.trim(), "Ignoring malformed cache timestamp");
                return None;
            }
        };

        debug!(currencies = table.len(), %fetched_at, "Loaded cached rates");
        Some(CacheEntry { table, fetched_at })
    }

    /// Overwrites the persisted entry
    pub fn store(&self, table: &RateTable, at: DateTime<Utc>) -> io::Result<()> {
        let Some(manager) = self.manager.as_ref() else {
            return Ok(());
        };

        let json = serde_json::to_string(table)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        manager.set(RATES_KEY, &json)?;
        manager.set(LAST_UPDATE_KEY, &at.to_rfc3339())
    }
}
