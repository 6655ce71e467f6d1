//! Cancellable repeating task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest period a task repeats at
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a handler invoked every `period`
///
/// The first invocation happens one full period after scheduling. Once
/// [`cancel`](ScheduledTask::cancel) returns the handler is never invoked
/// again. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawns `handler` on the current tokio runtime, repeating every `period`
    ///
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn schedule<F>(period: Duration, mut handler: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first tick (immediate)
            interval.tick().await;

            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                handler();
            }
        });

        Self { cancelled, handle }
    }

    /// Stops the task; no invocation starts after this returns
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
