//! Order lifecycle types

use crate::amount::Amount;
use crate::ids::{AgentId, OrderId};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order
    Bid,
    /// Sell order
    Ask,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

/// Order status
///
/// `Filled` holds exactly when `filled_quantity == quantity`; `Expired` is
/// reserved for time-in-force style expiry emitted by scenario tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }
}

/// A limit order resting on or removed from the book.
///
/// `sequence` is assigned at placement from the global order counter and is
/// strictly increasing across all orders of the run; together with the limit
/// price it fully determines matching priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub agent_id: AgentId,
    pub side: Side,
    pub price: Amount,
    pub quantity: Amount,
    pub filled_quantity: Amount,
    pub status: OrderStatus,
    pub tick_created: u64,
    pub sequence: u64,
}

impl Order {
    pub fn new(
        id: OrderId,
        agent_id: AgentId,
        side: Side,
        price: Amount,
        quantity: Amount,
        tick_created: u64,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            agent_id,
            side,
            price,
            quantity,
            filled_quantity: Amount::ZERO,
            status: OrderStatus::Open,
            tick_created,
            sequence,
        }
    }

    /// Unfilled remainder.
    pub fn remaining(&self) -> Amount {
        self.quantity - self.filled_quantity
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Record a fill and adjust status.
    ///
    /// # Panics
    /// Panics if the fill would exceed the order quantity.
    pub fn fill(&mut self, quantity: Amount) {
        let new_filled = self.filled_quantity + quantity;
        assert!(
            new_filled <= self.quantity,
            "Fill would exceed order quantity"
        );
        self.filled_quantity = new_filled;
        if self.filled_quantity == self.quantity {
            self.status = OrderStatus::Filled;
        }
    }

    /// Cancel the order.
    ///
    /// # Panics
    /// Panics if the order is not open.
    pub fn cancel(&mut self) {
        assert!(self.is_open(), "Cannot cancel a non-open order");
        self.status = OrderStatus::Cancelled;
    }
}
