//! When slow metrics are recomputed.
//!
//! Slow metrics (rampart hit targets, upgrade throughput, upgrade
//! structure) change rarely and are expensive enough to keep across
//! ticks. A [`RefreshPolicy`] decides, per commune per tick, whether to
//! drop them.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Decides whether slow metrics are invalidated on a given tick.
pub trait RefreshPolicy: core::fmt::Debug {
    /// Return `true` to invalidate slow metrics for this tick.
    fn should_refresh(&mut self, tick: u64) -> bool;
}

/// Refresh every `period` ticks. A period of 0 or 1 refreshes every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicRefresh {
    period: u64,
}

impl PeriodicRefresh {
    /// Create a periodic policy.
    pub const fn new(period: u64) -> Self {
        Self { period }
    }
}

impl RefreshPolicy for PeriodicRefresh {
    fn should_refresh(&mut self, tick: u64) -> bool {
        tick.checked_rem(self.period).is_none_or(|rest| rest == 0)
    }
}

/// Refresh with probability `1 / one_in`, from a seeded generator so runs
/// are reproducible.
#[derive(Debug, Clone)]
pub struct SeededRandomRefresh {
    rng: SmallRng,
    one_in: u32,
}

impl SeededRandomRefresh {
    /// Default odds: one tick in twenty.
    pub const DEFAULT_ONE_IN: u32 = 20;

    /// Create a random policy with the given seed and odds.
    pub fn new(seed: u64, one_in: u32) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            one_in: one_in.max(1),
        }
    }
}

impl RefreshPolicy for SeededRandomRefresh {
    fn should_refresh(&mut self, _tick: u64) -> bool {
        self.rng.random_ratio(1, self.one_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_fires_on_multiples() {
        let mut policy = PeriodicRefresh::new(5);
        let fired: Vec<u64> = (0..12).filter(|tick| policy.should_refresh(*tick)).collect();
        assert_eq!(fired, vec![0, 5, 10]);
    }

    #[test]
    fn zero_period_always_fires() {
        let mut policy = PeriodicRefresh::new(0);
        assert!(policy.should_refresh(7));
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let mut first = SeededRandomRefresh::new(42, 4);
        let mut second = SeededRandomRefresh::new(42, 4);
        let a: Vec<bool> = (0..64).map(|tick| first.should_refresh(tick)).collect();
        let b: Vec<bool> = (0..64).map(|tick| second.should_refresh(tick)).collect();
        assert_eq!(a, b);
        assert!(a.iter().any(|fired| *fired));
        assert!(a.iter().any(|fired| !*fired));
    }

    #[test]
    fn one_in_one_always_fires() {
        let mut policy = SeededRandomRefresh::new(7, 1);
        assert!((0..16).all(|tick| policy.should_refresh(tick)));
    }
}
