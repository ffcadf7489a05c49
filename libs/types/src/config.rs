//! Immutable per-run configuration

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// Run configuration, fixed for the lifetime of a run.
///
/// Serializes with amounts as decimal strings so the `RUN_CREATED` payload
/// is canonical-JSON safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Opening cash balance per agent
    pub initial_cash: Amount,
    /// Opening asset balance per agent
    pub initial_asset: Amount,
    /// Total fee in basis points per trade, split 50/50 buyer/seller
    pub trading_fee_bps: i64,
    /// Cash decay in basis points, applied every `decay_interval_ticks`
    pub decay_rate_bps: i64,
    /// Decay cadence in ticks; 0 disables decay
    pub decay_interval_ticks: u64,
    /// Per-agent action budget per tick
    pub max_actions_per_tick: u32,
    /// Lowest accepted limit price
    pub min_price: Amount,
    /// Highest accepted limit price
    pub max_price: Amount,
    /// Smallest accepted order quantity (at placement, not residual)
    pub min_quantity: Amount,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_cash: Amount::from_int(10_000),
            initial_asset: Amount::from_int(100),
            trading_fee_bps: 10,
            decay_rate_bps: 0,
            decay_interval_ticks: 0,
            max_actions_per_tick: 10,
            min_price: Amount::parse("0.00000001").expect("valid min price"),
            max_price: Amount::from_int(1_000_000),
            min_quantity: Amount::parse("0.00000001").expect("valid min quantity"),
        }
    }
}
