use crate::*;
use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// The environment of a single ledger call: who is calling, and when.
///
/// Both values are supplied by the host, never by the caller's payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub caller: Address,
    pub now: Timestamp,
}

impl Context {
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Context { caller, now }
    }
}

/// A source of ledger time
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in unix seconds
#[derive(Default, Copy, Clone, Debug)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to
#[derive(Default, Clone, Debug)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        ManualClock {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get().saturating_add(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(5);
        assert_eq!(clock.now(), 105);
        clock.set(7);
        assert_eq!(clock.now(), 7);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
