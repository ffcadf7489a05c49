//! World State Service
//!
//! The single container for everything a run owns: agents, orders, trades,
//! counters and running totals. The kernel has exclusive ownership; all
//! queries return value copies so external observers never hold references
//! into live state.
//!
//! **Key Invariants:**
//! - Order sequence numbers are unique and strictly increasing per run
//! - Book views are computed from live orders via an explicit ordering
//!   predicate — map iteration order never influences observable output
//! - Agent iteration for decay/bankruptcy uses insertion order

pub mod book;
pub mod state;

pub use book::{ask_priority, bid_priority, BookDepth, DepthLevel};
pub use state::World;
