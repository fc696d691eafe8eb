//! Tick-driven scan pacing.

use std::time::{Duration, Instant};

/// Decides whether enough time has passed for another scan.
///
/// The host calls [`ScanScheduler::poll`] from its main loop; the scheduler
/// never sleeps or spawns anything.
#[derive(Debug, Clone)]
pub struct ScanScheduler {
    interval: Duration,
    last_scan: Option<Instant>,
}

impl ScanScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_scan: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true (and records `now`) when a scan is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = match self.last_scan {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.last_scan = Some(now);
        }
        due
    }

    /// Record an out-of-band scan so the next periodic one is pushed back.
    pub fn mark_scanned(&mut self, now: Instant) {
        self.last_scan = Some(now);
    }
}
