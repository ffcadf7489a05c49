//! Agent state and status types

use crate::amount::Amount;
use crate::ids::AgentId;
use serde::{Deserialize, Serialize};

/// Agent status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Active and can trade
    Active,
    /// Permanently inert: no new orders, open orders cancelled (terminal)
    Bankrupt,
    /// Administratively parked
    Inactive,
}

/// A market participant.
///
/// The plaintext API key is never stored; only its SHA-256 fingerprint is
/// kept for lookup. While `Active`, cash is expected to be non-negative
/// after every settlement; the bankruptcy sweep catches the fee/decay cases
/// that push it below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub api_key_fingerprint: String,
    pub cash: Amount,
    pub asset: Amount,
    pub status: AgentStatus,
    pub actions_this_tick: u32,
    pub bankrupt_at_tick: Option<u64>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        api_key_fingerprint: impl Into<String>,
        cash: Amount,
        asset: Amount,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            api_key_fingerprint: api_key_fingerprint.into(),
            cash,
            asset,
            status: AgentStatus::Active,
            actions_this_tick: 0,
            bankrupt_at_tick: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    pub fn is_bankrupt(&self) -> bool {
        self.status == AgentStatus::Bankrupt
    }

    /// Mark the agent bankrupt. Irreversible.
    pub fn mark_bankrupt(&mut self, tick: u64) {
        self.status = AgentStatus::Bankrupt;
        self.bankrupt_at_tick = Some(tick);
    }
}
