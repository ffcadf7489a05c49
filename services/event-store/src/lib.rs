//! Event Store Service
//!
//! Append-only event log with a running SHA-256 hash chain. Every state
//! transition in a run is witnessed by exactly one event; the chain makes
//! any tampering detectable by replaying the hashes from GENESIS.
//!
//! **Key Invariants:**
//! - Event sequences are zero-based, gapless, and strictly increasing
//! - The first event's `prev_hash` is the literal `"GENESIS"`
//! - Verification recomputes every hash; stored hashes are never trusted
//! - `created_at` is informational only and never enters a hash

pub mod event;
pub mod export;
pub mod store;

pub use event::{Event, EventType};
pub use store::{ChainVerification, EventStore, GENESIS};
