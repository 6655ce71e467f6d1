//! Rate refresh scheduling
//!
//! `RateScheduler` owns the in-memory rate table, the surfaced error and the
//! refresh timer. It decides when to serve cached rates and when to fetch, and
//! it is the only writer of the rate cache.
//!
//! Fetches run as spawned tasks that report back over a channel, tagged with a
//! generation number. Starting a fetch aborts the previous one, and a
//! completion whose generation is not the current in-flight fetch is dropped
//! without touching state or cache.

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::RateCache;
use crate::convert::convert_in;
use crate::data::{FetchError, RateSource, RateTable};
use crate::schedule::ScheduledTask;

/// Age below which cached rates are used without a fetch
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for the refresh cycle
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Freshness threshold and timer period
    pub interval: Duration,
    /// Whether the periodic timer runs
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: REFRESH_INTERVAL,
            enabled: true,
        }
    }
}

/// Messages delivered to the scheduler from its timer and fetch tasks
#[derive(Debug)]
pub enum RefreshMessage {
    /// The refresh timer fired
    PeriodicTick,
    /// A fetch task finished
    FetchCompleted {
        generation: u64,
        result: Result<RateTable, FetchError>,
    },
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    abort: AbortHandle,
}

/// Owner of the current rates and their refresh cycle
pub struct RateScheduler {
    source: Arc<dyn RateSource>,
    cache: RateCache,
    config: RefreshConfig,
    rates: RateTable,
    error: Option<FetchError>,
    last_update: Option<DateTime<Utc>>,
    generation: u64,
    in_flight: Option<InFlight>,
    timer: Option<ScheduledTask>,
    tx: mpsc::UnboundedSender<RefreshMessage>,
    rx: mpsc::UnboundedReceiver<RefreshMessage>,
}

impl RateScheduler {
    pub fn new(source: Arc<dyn RateSource>, cache: RateCache, config: RefreshConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            cache,
            config,
            rates: RateTable::default(),
            error: None,
            last_update: None,
            generation: 0,
            in_flight: None,
            timer: None,
            tx,
            rx,
        }
    }

    /// Runs the initial tick and starts the periodic timer
    pub fn start(&mut self) {
        self.initial_tick();
        if self.config.enabled && self.timer.is_none() {
            let tx = self.tx.clone();
            self.timer = Some(ScheduledTask::schedule(self.config.interval, move || {
                let _ = tx.send(RefreshMessage::PeriodicTick);
            }));
        }
    }

    /// Loads the cache and fetches only if it is missing or stale
    ///
    /// Returns true if a fetch was started.
    pub fn initial_tick(&mut self) -> bool {
        self.initial_tick_at(Utc::now())
    }

    /// [`initial_tick`](Self::initial_tick) evaluated at a given time
    pub fn initial_tick_at(&mut self, now: DateTime<Utc>) -> bool {
        match self.cache.load() {
            Some(entry) if is_fresh(entry.fetched_at, now, self.config.interval) => {
                info!(
                    currencies = entry.table.len(),
                    fetched_at = %entry.fetched_at,
                    "Using cached rates"
                );
                self.rates = entry.table;
                self.last_update = Some(entry.fetched_at);
                false
            }
            Some(entry) => {
                debug!(fetched_at = %entry.fetched_at, "Cached rates are stale");
                self.start_fetch();
                true
            }
            None => {
                debug!("No cached rates");
                self.start_fetch();
                true
            }
        }
    }

    /// Fetches unconditionally, ignoring cache freshness
    pub fn periodic_tick(&mut self) {
        self.start_fetch();
    }

    /// Cancels any in-flight fetch and starts a new one
    ///
    /// Returns the generation of the new fetch.
    pub fn start_fetch(&mut self) -> u64 {
        self.cancel_in_flight();

        self.generation += 1;
        let generation = self.generation;
        let (abort, registration) = AbortHandle::new_pair();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let fetch = Abortable::new(async move { source.fetch().await }, registration);
            if let Ok(result) = fetch.await {
                let _ = tx.send(RefreshMessage::FetchCompleted { generation, result });
            }
        });

        debug!(generation, "Started rate fetch");
        self.in_flight = Some(InFlight { generation, abort });
        generation
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort.abort();
            debug!(generation = in_flight.generation, "Cancelled in-flight fetch");
        }
    }

    /// Waits for the next timer tick or fetch completion
    pub async fn next_message(&mut self) -> Option<RefreshMessage> {
        self.rx.recv().await
    }

    /// Applies a message, returning true if visible state may have changed
    pub fn handle_message(&mut self, message: RefreshMessage) -> bool {
        match message {
            RefreshMessage::PeriodicTick => {
                self.periodic_tick();
                true
            }
            RefreshMessage::FetchCompleted { generation, result } => {
                match &self.in_flight {
                    Some(in_flight) if in_flight.generation == generation => {}
                    _ => {
                        debug!(generation, "Discarding result of cancelled fetch");
                        return false;
                    }
                }
                self.in_flight = None;
                self.apply_result(result, Utc::now());
                true
            }
        }
    }

    /// Processes messages until no fetch is in flight
    pub async fn wait_for_fetch(&mut self) {
        while self.is_fetching() {
            match self.next_message().await {
                Some(message) => {
                    self.handle_message(message);
                }
                None => break,
            }
        }
    }

    fn apply_result(&mut self, result: Result<RateTable, FetchError>, now: DateTime<Utc>) {
        match result {
            Ok(table) => {
                if let Err(e) = self.cache.store(&table, now) {
                    warn!(error = %e, "Failed to write rate cache");
                }
                info!(currencies = table.len(), "Rates updated");
                self.rates = table;
                self.error = None;
                self.last_update = Some(now);
            }
            Err(e) => {
                warn!(error = %e, "Rate fetch failed");
                self.error = Some(e);
            }
        }
    }

    /// Stops the timer and cancels any in-flight fetch
    pub fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.cancel_in_flight();
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// The most recent fetch error, cleared by the next successful fetch
    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// When the current rates were fetched
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Converts using the current rates; `None` while either code is unknown
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        convert_in(&self.rates, amount, from, to)
    }
}

impl Drop for RateScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// True if data fetched at `fetched_at` is younger than `threshold` at `now`
///
/// Timestamps in the future count as fresh.
pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    match now.signed_duration_since(fetched_at).to_std() {
        Ok(age) => age < threshold,
        Err(_) => true,
    }
}
