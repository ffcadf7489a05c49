//! Matching Engine Service
//!
//! Continuous double auction with strict price-time priority. Placement
//! validates, then matches immediately against the opposite side of the
//! book; every crossing clears at the resting order's limit price, so price
//! improvement always accrues to the aggressor.
//!
//! **Key Invariants:**
//! - Matching depends only on open opposite-side orders, their limit
//!   prices, and their sequence numbers
//! - Funds are gated up front but never escrowed; balances move only as
//!   fills settle
//! - Cash is conserved modulo fees; asset quantity is conserved exactly

pub mod matching;
pub mod settlement;

pub use matching::{cancel_order, place_limit_order, CancelReport, PlacementReport};
pub use settlement::BalanceUpdate;
