//! Tick clock for the scheduler.
//!
//! The tick number is the only temporal state the scheduler keeps. Metric
//! epochs and refresh decisions are all derived from it.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter.
///
/// Starts at tick 0, meaning "no tick has run yet". The first call to
/// [`TickClock::advance`] moves it to tick 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickClock {
    tick: u64,
}

impl TickClock {
    /// A clock that has not ticked yet.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Resume a clock at a given tick (state restoration).
    pub const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// The current tick.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance by one tick and return the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] at `u64::MAX`.
    pub const fn advance(&mut self) -> Result<u64, ClockError> {
        match self.tick.checked_add(1) {
            Some(next) => {
                self.tick = next;
                Ok(next)
            }
            None => Err(ClockError::TickOverflow),
        }
    }
}
