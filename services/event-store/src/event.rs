//! Event structure and type taxonomy

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use types::ids::{AgentId, RunId};

/// Closed set of event types emitted by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RunCreated,
    RunStarted,
    RunStopped,
    AgentCreated,
    TickStart,
    OrderPlaced,
    OrderRejected,
    OrderCancelled,
    TradeExecuted,
    BalanceUpdated,
    RateLimitHit,
    DecayApplied,
    AgentBankrupt,
    TickEnd,
}

impl EventType {
    /// Wire tag, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::RunCreated => "RUN_CREATED",
            EventType::RunStarted => "RUN_STARTED",
            EventType::RunStopped => "RUN_STOPPED",
            EventType::AgentCreated => "AGENT_CREATED",
            EventType::TickStart => "TICK_START",
            EventType::OrderPlaced => "ORDER_PLACED",
            EventType::OrderRejected => "ORDER_REJECTED",
            EventType::OrderCancelled => "ORDER_CANCELLED",
            EventType::TradeExecuted => "TRADE_EXECUTED",
            EventType::BalanceUpdated => "BALANCE_UPDATED",
            EventType::RateLimitHit => "RATE_LIMIT_HIT",
            EventType::DecayApplied => "DECAY_APPLIED",
            EventType::AgentBankrupt => "AGENT_BANKRUPT",
            EventType::TickEnd => "TICK_END",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One witnessed state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic 1-based id
    pub id: u64,
    pub run_id: RunId,
    pub tick_id: u64,
    /// Zero-based, gapless per-run sequence
    pub seq: u64,
    pub event_type: EventType,
    pub agent_id: Option<AgentId>,
    pub payload: Value,
    pub prev_hash: String,
    pub event_hash: String,
    /// Unix nanoseconds, informational only — excluded from the hash
    pub created_at: i64,
}

impl Event {
    /// The hash input for this event, given a previous hash.
    ///
    /// `agent_id` encodes as JSON null when absent so the input shape is
    /// fixed. `created_at` and `id` are deliberately absent.
    pub fn hash_input(
        run_id: RunId,
        tick_id: u64,
        seq: u64,
        event_type: EventType,
        agent_id: Option<AgentId>,
        payload: &Value,
        prev_hash: &str,
    ) -> Value {
        json!({
            "run_id": run_id,
            "tick_id": tick_id,
            "event_seq": seq,
            "event_type": event_type,
            "agent_id": agent_id,
            "payload": payload,
            "prev_hash": prev_hash,
        })
    }

    /// Recompute this event's hash from scratch against `prev_hash`.
    pub fn compute_hash(&self, prev_hash: &str) -> String {
        canonical::hash_value(&Self::hash_input(
            self.run_id,
            self.tick_id,
            self.seq,
            self.event_type,
            self.agent_id,
            &self.payload,
            prev_hash,
        ))
    }
}
