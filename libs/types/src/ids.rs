//! Unique identifier types and the deterministic id generator
//!
//! Ids are UUID-shaped but never random: the generator hashes
//! `"{seed}-{counter}"` with SHA-256 and reshapes the first 16 bytes into
//! the v4 layout. The kernel is the only caller, so the id sequence is a
//! pure function of the run seed and the ordered action log.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a run
    RunId
}

uuid_id! {
    /// Unique identifier for an agent
    AgentId
}

uuid_id! {
    /// Unique identifier for an order
    OrderId
}

uuid_id! {
    /// Unique identifier for a trade
    TradeId
}

/// Deterministic id generator seeded from the run seed.
///
/// Every draw consumes one counter value; replaying the same call sequence
/// reproduces the same ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: u64,
    counter: u64,
}

impl IdGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    /// Number of ids drawn so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Draw the next UUID-shaped id.
    pub fn next_uuid(&mut self) -> Uuid {
        let digest = Sha256::digest(format!("{}-{}", self.seed, self.counter).as_bytes());
        self.counter += 1;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }

    pub fn next_run_id(&mut self) -> RunId {
        RunId(self.next_uuid())
    }

    pub fn next_agent_id(&mut self) -> AgentId {
        AgentId(self.next_uuid())
    }

    pub fn next_order_id(&mut self) -> OrderId {
        OrderId(self.next_uuid())
    }

    pub fn next_trade_id(&mut self) -> TradeId {
        TradeId(self.next_uuid())
    }
}
