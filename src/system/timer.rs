//! Monotonic time
//!
//! Everything in the crate takes time as plain microseconds of a monotonic clock,
//! so the same code runs against the hardware timer and against a hand-driven
//! clock in tests.

/// Source of monotonic microseconds
pub trait Clock {
    fn now_us(&self) -> u64;
}

/// Fixed-period deadline
///
/// Never blocks: the owner asks whether the deadline has passed and skips its
/// work until it has. A new timer is due immediately.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    period: u64,
    deadline: u64,
}

impl Timer {
    pub const fn new(period: u64) -> Self {
        Self { period, deadline: 0 }
    }

    /// Whether the deadline has passed; with `reset`, a passed deadline moves to
    /// one period from `now`
    pub fn time_has_passed(&mut self, now: u64, reset: bool) -> bool {
        if now < self.deadline {
            return false;
        }
        if reset {
            self.reset(now);
        }
        true
    }

    /// Starts a new period at `now`
    pub fn reset(&mut self, now: u64) {
        self.deadline = now.saturating_add(self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct ManualClock {
        now: Cell<u64>,
    }

    impl ManualClock {
        fn new(start: u64) -> Self {
            Self { now: Cell::new(start) }
        }

        fn set(&self, now: u64) {
            self.now.set(now);
        }

        fn advance(&self, us: u64) {
            self.now.set(self.now.get().saturating_add(us));
        }
    }

    impl Clock for ManualClock {
        fn now_us(&self) -> u64 {
            self.now.get()
        }
    }

    #[test]
    fn fires_once_per_period() {
        let mut timer = Timer::new(100);
        assert!(timer.time_has_passed(0, true));
        assert!(!timer.time_has_passed(50, true));
        assert!(timer.time_has_passed(100, true));
        assert!(!timer.time_has_passed(199, true));
    }

    #[test]
    fn check_without_reset_stays_due() {
        let mut timer = Timer::new(100);
        timer.reset(0);
        assert!(timer.time_has_passed(150, false));
        assert!(timer.time_has_passed(151, false));
    }

    #[test]
    fn manual_clock() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_us(), 15);
        clock.set(3);
        assert_eq!(clock.now_us(), 3);
    }
}
