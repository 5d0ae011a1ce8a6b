//! Terminal transfer fees.
//!
//! Every terminal transfer burns energy proportional to the amount and
//! growing with distance: `ceil(amount * (1 - e^(-distance / 30)))`.

use crate::constants::TRANSFER_FEE_RANGE;

/// Energy fee for moving `amount` units over `distance` zones.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn transfer_cost(amount: u32, distance: u32) -> u32 {
    let fee = fee(f64::from(amount), distance);
    // The fee never exceeds the amount, which fits in u32.
    fee.clamp(0.0, f64::from(amount)) as u32
}

fn fee(amount: f64, distance: u32) -> f64 {
    let ratio = 1.0 - (-f64::from(distance) / TRANSFER_FEE_RANGE).exp();
    (amount * ratio).ceil()
}

/// Largest amount up to `desired` whose fee stays under `budget`.
///
/// Starting from `desired`, the amount shrinks by `(amount - 1) * 0.8`
/// until the fee drops below the budget. A budget below 1 is treated as 1,
/// so a zero-distance transfer always goes through in full.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn largest_transaction_amount(budget: f64, desired: u32, distance: u32) -> u32 {
    let budget = budget.max(1.0);
    let mut amount = f64::from(desired);

    while fee(amount, distance) >= budget {
        amount = (amount - 1.0) * 0.8;
    }

    let floored = amount.floor();
    if floored.is_nan() || floored <= 0.0 {
        return 0;
    }
    floored.min(f64::from(desired)) as u32
}

/// Largest energy amount up to `desired` that still fits in `budget` once
/// its own fee is added on top.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn largest_energy_transfer(budget: f64, desired: u32, distance: u32) -> u32 {
    let budget = budget.floor().clamp(0.0, f64::from(u32::MAX)) as u32;
    let fits = |amount: u32| {
        u64::from(amount).saturating_add(u64::from(transfer_cost(amount, distance))) <= u64::from(budget)
    };

    // amount + fee grows with amount, so bisect for the last fit.
    let (mut low, mut high) = (0_u32, desired.min(budget));
    while low < high {
        let mid = low.saturating_add(high.saturating_sub(low).div_ceil(2));
        if fits(mid) {
            low = mid;
        } else {
            high = mid.saturating_sub(1);
        }
    }
    low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_grows_with_distance() {
        // 500 * (1 - e^-0.1) = 47.58
        assert_eq!(transfer_cost(500, 3), 48);
        assert_eq!(transfer_cost(500, 0), 0);
        assert!(transfer_cost(500, 30) > transfer_cost(500, 10));
    }

    #[test]
    fn affordable_amount_is_unchanged() {
        assert_eq!(largest_transaction_amount(800.0, 500, 3), 500);
    }

    #[test]
    fn amount_shrinks_under_a_tight_budget() {
        let amount = largest_transaction_amount(20.0, 500, 3);
        assert!(amount < 500);
        assert!(amount > 0);
        assert!(transfer_cost(amount, 3) < 20);
    }

    #[test]
    fn zero_desired_is_zero() {
        assert_eq!(largest_transaction_amount(100.0, 0, 5), 0);
    }

    #[test]
    fn energy_transfer_pays_its_own_fee() {
        // 730 + ceil(730 * 0.0952) = 800; one more unit costs 801.
        assert_eq!(largest_energy_transfer(800.0, 1000, 3), 730);
        assert_eq!(largest_energy_transfer(800.0, 500, 3), 500);
        assert_eq!(largest_energy_transfer(800.0, 1000, 0), 800);
        assert_eq!(largest_energy_transfer(0.0, 1000, 3), 0);
    }

    #[test]
    fn never_exceeds_desired() {
        assert_eq!(largest_transaction_amount(1_000_000.0, 1234, 0), 1234);
    }
}
