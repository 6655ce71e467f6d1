//! Core data models for rateconv
//!
//! This module contains the rate table types shared by the fetcher, the cache
//! and the conversion engine, plus the HTTP client for the rate provider.

pub mod rates;

pub use rates::{FetchError, RateSource, RatesClient, DEFAULT_RATES_URL};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while validating a rate table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateTableError {
    /// A rate value was zero, negative or not finite
    #[error("Invalid rate for '{code}': {value}")]
    InvalidRate { code: String, value: f64 },

    /// Two keys collapse to the same lowercase code
    #[error("Duplicate currency code: '{0}'")]
    DuplicateCode(String),

    /// A currency code was empty or whitespace
    #[error("Empty currency code")]
    EmptyCode,
}

/// One currency's rate against the provider's base unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    /// Units of this currency per base unit; positive and finite once inside a `RateTable`
    pub value: f64,
    /// Human-readable name, e.g. "Bitcoin"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display unit, e.g. "$"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Rate {
    /// Creates a rate with only a value
    pub fn new(value: f64) -> Self {
        Self {
            value,
            name: None,
            unit: None,
        }
    }

    fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// Complete set of rates from one provider response, keyed by lowercase code
///
/// Deserialization goes through [`RateTable::from_rates`], so a table read from
/// the network or from disk is always validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Rate>",
    into = "BTreeMap<String, Rate>"
)]
pub struct RateTable {
    rates: BTreeMap<String, Rate>,
}

impl RateTable {
    /// Builds a validated table, canonicalizing codes to lowercase
    pub fn from_rates<I, K>(rates: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (K, Rate)>,
        K: AsRef<str>,
    {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            let code = canonical_code(code.as_ref());
            if code.is_empty() {
                return Err(RateTableError::EmptyCode);
            }
            if !rate.is_valid() {
                return Err(RateTableError::InvalidRate {
                    code,
                    value: rate.value,
                });
            }
            if table.contains_key(&code) {
                return Err(RateTableError::DuplicateCode(code));
            }
            table.insert(code, rate);
        }
        Ok(Self { rates: table })
    }

    /// Looks up a rate by code, ignoring case
    pub fn get(&self, code: &str) -> Option<&Rate> {
        self.rates.get(&canonical_code(code))
    }

    /// Returns true if the code is present, ignoring case
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Currency codes in sorted order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    /// Iterates `(code, rate)` pairs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rate)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Rate>> for RateTable {
    type Error = RateTableError;

    fn try_from(rates: BTreeMap<String, Rate>) -> Result<Self, Self::Error> {
        Self::from_rates(rates)
    }
}

impl From<RateTable> for BTreeMap<String, Rate> {
    fn from(table: RateTable) -> Self {
        table.rates
    }
}

/// Normalizes a currency code to its canonical lowercase form
pub fn canonical_code(code: &str) -> String {
    code.trim().to_lowercase()
}
