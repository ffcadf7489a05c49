//! Trade execution types

use crate::amount::Amount;
use crate::ids::{AgentId, OrderId, TradeId};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// An executed trade. Immutable once appended to the world.
///
/// `aggressor` is the side of the incoming order that crossed the book;
/// the execution price is always the resting order's limit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub tick: u64,
    pub price: Amount,
    pub quantity: Amount,
    pub buyer_order_id: OrderId,
    pub seller_order_id: OrderId,
    pub buyer_agent_id: AgentId,
    pub seller_agent_id: AgentId,
    pub fee_total: Amount,
    pub aggressor: Side,
}

impl Trade {
    /// Cash value exchanged, before fees.
    pub fn value(&self) -> Amount {
        self.price.mul(self.quantity)
    }
}
