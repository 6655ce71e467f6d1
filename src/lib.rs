//! rateconv library
//!
//! Rate cache, fetcher, refresh scheduler and conversion engine, plus the
//! terminal UI built on top of them. Exposed for use in integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod convert;
pub mod data;
pub mod logging;
pub mod refresh;
pub mod schedule;
pub mod ui;
