//! Error taxonomy
//!
//! Per-action faults (`ActionError`) become structured wire results with a
//! `ReasonCode`; they never cross the submission boundary as panics.
//! Lifecycle faults (`KernelError`) guard the run state machine.

use crate::action::ReasonCode;
use thiserror::Error;

/// A fault attributable to a single submitted action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("order not found: {order_id}")]
    OrderNotFound { order_id: String },

    #[error("order not owned by caller: {order_id}")]
    OrderNotOwned { order_id: String },

    #[error("agent is bankrupt")]
    AgentBankrupt,

    #[error("rate limit exceeded for this tick")]
    RateLimited,

    #[error("run is not active")]
    RunNotActive,
}

impl ActionError {
    /// The wire reason code for this fault.
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            ActionError::InvalidAction(_) => ReasonCode::InvalidAction,
            ActionError::InvalidPrice(_) => ReasonCode::InvalidPrice,
            ActionError::InvalidQuantity(_) => ReasonCode::InvalidQuantity,
            ActionError::InsufficientFunds { .. } => ReasonCode::InsufficientFunds,
            ActionError::OrderNotFound { .. } => ReasonCode::OrderNotFound,
            ActionError::OrderNotOwned { .. } => ReasonCode::OrderNotOwned,
            ActionError::AgentBankrupt => ReasonCode::AgentBankrupt,
            ActionError::RateLimited => ReasonCode::RateLimited,
            ActionError::RunNotActive => ReasonCode::RunNotActive,
        }
    }
}

/// A fault in the run lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("run already started")]
    AlreadyRunning,

    #[error("run is not running")]
    NotRunning,
}
