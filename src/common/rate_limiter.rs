//! Sliding-window limiter for outgoing exchange messages
//!
//! The exchange enforces a hard quota of messages per trailing window and
//! disconnects violators, so every outgoing command is gated here. The
//! limiter keeps the timestamps of recent sends and prunes them lazily.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::debug;

/// Tracks outgoing message timestamps within a trailing window.
///
/// Timestamps are milliseconds since the limiter's creation. The `*_at`
/// variants take an explicit timestamp and carry the full logic; the
/// wall-clock wrappers are what production paths call.
#[derive(Debug)]
pub struct RateLimiter {
    window_ms: u64,
    limit: usize,
    reserve: usize,
    events: VecDeque<u64>,
    epoch: Instant,
}

impl RateLimiter {
    pub fn new(window_ms: u64, limit: usize, reserve: usize) -> Self {
        RateLimiter {
            window_ms,
            limit,
            reserve,
            events: VecDeque::new(),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Number of live entries (call after a prune for an accurate count)
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Record an outgoing message now. Call immediately after every send.
    pub fn record_event(&mut self) {
        let now = self.now_ms();
        self.record_event_at(now);
    }

    pub fn record_event_at(&mut self, now_ms: u64) {
        self.prune_at(now_ms);
        self.events.push_back(now_ms);
    }

    /// Drop entries that have aged out of the window
    pub fn prune(&mut self) {
        let now = self.now_ms();
        self.prune_at(now);
    }

    pub fn prune_at(&mut self, now_ms: u64) {
        while let Some(&oldest) = self.events.front() {
            if now_ms.saturating_sub(oldest) > self.window_ms {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// True when one more message fits under the quota
    pub fn has_capacity(&mut self) -> bool {
        let now = self.now_ms();
        self.has_capacity_at(now)
    }

    pub fn has_capacity_at(&mut self, now_ms: u64) -> bool {
        self.prune_at(now_ms);
        self.events.len() < self.limit
    }

    /// True when a new order fits while still holding back slots for hedge
    /// and cancel traffic
    pub fn has_headroom(&mut self) -> bool {
        let now = self.now_ms();
        self.has_headroom_at(now)
    }

    pub fn has_headroom_at(&mut self, now_ms: u64) -> bool {
        self.prune_at(now_ms);
        self.events.len() + self.reserve <= self.limit
    }

    /// Block until the window has room for one more message.
    ///
    /// Sleeps exactly until the oldest entry ages out rather than polling.
    /// This never fails; it only delays the caller.
    pub fn await_capacity(&mut self) {
        loop {
            let now = self.now_ms();
            self.prune_at(now);
            if self.events.len() < self.limit {
                return;
            }
            let oldest = self.events[0];
            let wake_at = oldest + self.window_ms + 1;
            let sleep_ms = wake_at.saturating_sub(now).max(1);
            debug!(sleep_ms, live = self.events.len(), "waiting for message window capacity");
            std::thread::sleep(Duration::from_millis(sleep_ms));
        }
    }
}
