//! Device clock sources.

use std::time::Instant;

/// The device's own microsecond clock.
pub trait DeviceClock {
    fn now_us(&self) -> u64;
}

/// Monotonic wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceClock for SystemClock {
    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now_us: u64,
}

impl ManualClock {
    pub fn new(now_us: u64) -> Self {
        Self { now_us }
    }

    pub fn set(&mut self, now_us: u64) {
        self.now_us = now_us;
    }

    pub fn advance(&mut self, us: u64) {
        self.now_us = self.now_us.saturating_add(us);
    }
}

impl DeviceClock for ManualClock {
    fn now_us(&self) -> u64 {
        self.now_us
    }
}
