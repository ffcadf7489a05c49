//! Seed-driven scenario effects
//!
//! The PRNG's only consumers. Scenarios produce data — jittered opening
//! balances and action schedules — for the run harness to feed through the
//! normal submission path; they never reach into matching or ordering.

use types::action::Action;
use types::amount::Amount;
use types::config::RunConfig;
use types::order::Side;
use types::rng::SimRng;

/// Randomized initial allocations: per-agent `(cash, asset)` pairs jittered
/// around the configured opening balances by at most `spread_bps` in either
/// direction. Allocations never go below zero.
pub fn randomized_allocations(
    config: &RunConfig,
    rng: &mut SimRng,
    count: usize,
    spread_bps: i64,
) -> Vec<(Amount, Amount)> {
    (0..count)
        .map(|_| {
            (
                jitter(config.initial_cash, rng, spread_bps),
                jitter(config.initial_asset, rng, spread_bps),
            )
        })
        .collect()
}

fn jitter(base: Amount, rng: &mut SimRng, spread_bps: i64) -> Amount {
    let spread = base.mul_bps(spread_bps);
    let lo = (base - spread).max(Amount::ZERO);
    let hi = base + spread;
    Amount::from_units(rng.big_range(lo.units(), hi.units()))
}

/// A demand shock: a burst of same-side aggressive orders across a tick
/// window, with seed-driven quantities.
#[derive(Debug, Clone)]
pub struct DemandShock {
    pub side: Side,
    /// Limit price of every shock order
    pub price: Amount,
    /// Upper bound for each order's quantity
    pub max_quantity: Amount,
    pub start_tick: u64,
    pub ticks: u64,
    pub orders_per_tick: u32,
}

/// Build the `(tick, action)` schedule for a shock. Quantities are drawn
/// with `big_range`, so the schedule is a pure function of the seed.
pub fn demand_shock_schedule(shock: &DemandShock, rng: &mut SimRng) -> Vec<(u64, Action)> {
    let mut schedule = Vec::new();
    for tick in shock.start_tick..shock.start_tick + shock.ticks {
        for _ in 0..shock.orders_per_tick {
            let quantity = Amount::from_units(rng.big_range(1, shock.max_quantity.units()));
            schedule.push((
                tick,
                Action::PlaceLimitOrder {
                    side: shock.side,
                    price: shock.price.to_string(),
                    quantity: quantity.to_string(),
                },
            ));
        }
    }
    schedule
}
