//! Action variants and submission result types
//!
//! The wire form of an action is converted to the tagged variant at the
//! boundary; the kernel and matching engine only ever see the variant.

use crate::ids::OrderId;
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// An agent-submitted action.
///
/// Price and quantity stay as decimal strings until placement validation;
/// parsing is part of the validation sequence, not the wire decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    PlaceLimitOrder {
        side: Side,
        price: String,
        quantity: String,
    },
    CancelOrder {
        order_id: OrderId,
    },
}

/// Closed set of rejection reason codes exposed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    InsufficientFunds,
    InvalidPrice,
    InvalidQuantity,
    OrderNotFound,
    OrderNotOwned,
    AgentBankrupt,
    RateLimited,
    InvalidAction,
    RunNotActive,
    /// Reserved: the current design returns the cached result instead.
    DuplicateIdempotencyKey,
}

/// Per-action outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Accepted,
    Rejected,
}

/// Result of a single action within a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_index: usize,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn accepted(action_index: usize, order_id: Option<OrderId>) -> Self {
        Self {
            action_index,
            status: ActionStatus::Accepted,
            order_id,
            reason_code: None,
            message: None,
        }
    }

    pub fn rejected(action_index: usize, reason: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            action_index,
            status: ActionStatus::Rejected,
            order_id: None,
            reason_code: Some(reason),
            message: Some(message.into()),
        }
    }
}

/// Result of one `submit_actions` call. Cached verbatim for idempotency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub tick_id: u64,
    pub results: Vec<ActionResult>,
}
