//! Injectable clock (spec §9 "Global singletons").
//!
//! The clock is the one piece of process-wide state this system needs; it is
//! injected as a first-class dependency so tests can pin it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now", in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> i64;
}

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs() as i64
    }
}

/// A clock pinned to a fixed value, for deterministic tests (spec §8 scenario 1).
#[derive(Debug)]
pub struct FixedClock {
    seconds: AtomicI64,
}

impl FixedClock {
    pub fn new(seconds: i64) -> Self {
        Self {
            seconds: AtomicI64::new(seconds),
        }
    }

    pub fn set(&self, seconds: i64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_seconds(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_pinned_value() {
        let clock = FixedClock::new(123);
        assert_eq!(clock.now_seconds(), 123);
    }

    #[test]
    fn fixed_clock_can_be_advanced() {
        let clock = FixedClock::new(123);
        clock.set(456);
        assert_eq!(clock.now_seconds(), 456);
    }

    #[test]
    fn system_clock_is_plausible() {
        let clock = SystemClock;
        assert!(clock.now_seconds() > 1_700_000_000);
    }
}
