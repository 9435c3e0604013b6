//! Scheduling helpers for the event loop
//!
//! Network calls are the only suspension points of the viewer. Responses can
//! come back in any order relative to new user input, so every request is
//! tagged with a monotonically increasing sequence number and a response is
//! applied only while its tag is still the latest one.

use std::future::Future;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

/// Monotonic tags for in-flight requests
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags a new request, superseding every earlier one
    pub fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Supersedes the in-flight request without starting a new one
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Cancellable trailing-edge debounce
///
/// Each call to [`Debouncer::bump`] invalidates the previously scheduled wait.
/// The generation counter is shared with the returned futures so they can be
/// moved into a spawned task.
#[derive(Debug, Clone)]
pub struct Debouncer {
    generation: Arc<AtomicU64>,
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules a new wait, cancelling the pending one
    pub fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Cancels the pending wait
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Sleeps for the debounce delay, then reports whether `generation` is
    /// still the latest one
    pub fn wait(&self, generation: u64) -> impl Future<Output = bool> + Send + 'static {
        let counter = Arc::clone(&self.generation);
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            counter.load(Ordering::SeqCst) == generation
        }
    }
}
