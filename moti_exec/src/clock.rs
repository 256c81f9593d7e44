//! # Clock module
//!
//! Millisecond time source and blocking wait used by the motion worker.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic millisecond clock.
pub trait Clock: Send + Sync {
    /// Milliseconds elapsed since the clock's epoch.
    fn now_ms(&self) -> u64;

    /// Block the calling thread for the given number of milliseconds.
    fn wait_ms(&self, ms: u64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Wall clock time, backed by `Instant` and `thread::sleep`.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

/// Simulated time which only advances when someone waits on it.
///
/// Every clone shares the same time, so a worker waiting on one clone moves
/// time forward for everybody holding another.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now_ms: Arc<AtomicU64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn wait_ms(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without blocking.
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn wait_ms(&self, ms: u64) {
        self.advance_ms(ms);

        // Give other threads a chance to observe the new time
        thread::yield_now();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_clock_shared() {
        let clock = SimClock::new();
        let other = clock.clone();

        assert_eq!(other.now_ms(), 0);
        clock.wait_ms(20);
        clock.advance_ms(5);
        assert_eq!(other.now_ms(), 25);
    }
}
