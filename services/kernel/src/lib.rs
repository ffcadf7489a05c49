//! Simulation Kernel
//!
//! The single-owner actor at the center of a run. It alone mutates the
//! world state and the event store; external collaborators reach it only
//! through `submit_actions`, `advance_tick`, `create_agent`, `start`,
//! `stop`, and the read-only world queries. Within a tick, every state
//! transition is one synchronous sequence — nothing suspends mid-step.
//!
//! **Key Invariants:**
//! - Receive sequences are handed out in submission order and are the sole
//!   determinant of intra-tick processing order
//! - Every observable change is witnessed by exactly one chained event
//! - Identical `(config, seed, ordered submissions)` reproduce identical
//!   final event hashes
//!
//! # Modules
//! - `controller` — Run lifecycle, action intake, tick advancement
//! - `idempotency` — Submission dedup cache with a 100-tick flush
//! - `replay` — World reconstruction from a verified event log
//! - `scenario` — Seed-driven scenario effects (allocations, demand shocks)

pub mod controller;
pub mod idempotency;
pub mod replay;
pub mod scenario;

pub use controller::{RunState, SimKernel, TickSummary};
pub use replay::{replay, ReplayError};
