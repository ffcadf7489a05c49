//! Trade settlement and fee splitting

use serde::{Deserialize, Serialize};
use types::amount::Amount;
use types::ids::AgentId;
use world::World;

/// Post-settlement balance snapshot for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub agent_id: AgentId,
    pub cash: Amount,
    pub asset: Amount,
}

/// Split a total fee between buyer and seller.
///
/// The seller's half truncates toward zero; the one-unit remainder of an
/// odd total stays in the buyer's debit, so `fee_total = buyer_fee +
/// seller_fee` holds exactly.
pub fn split_fee(fee_total: Amount) -> (Amount, Amount) {
    let seller_fee = Amount::from_units(fee_total.units() / 2);
    let buyer_fee = fee_total - seller_fee;
    (buyer_fee, seller_fee)
}

/// Apply one trade's balance deltas.
///
/// Buyer pays `value + buyer_fee` cash and receives `quantity` asset; the
/// seller delivers `quantity` asset and receives `value − seller_fee` cash.
/// The buyer is settled first; self-trades therefore net to a pure fee
/// debit. Returns buyer-then-seller snapshots for event emission.
pub fn settle_trade(
    world: &mut World,
    buyer_agent_id: AgentId,
    seller_agent_id: AgentId,
    value: Amount,
    quantity: Amount,
    buyer_fee: Amount,
    seller_fee: Amount,
) -> (BalanceUpdate, BalanceUpdate) {
    let buyer = world
        .agent_mut(&buyer_agent_id)
        .expect("buyer exists at settlement");
    buyer.cash -= value + buyer_fee;
    buyer.asset += quantity;

    let seller = world
        .agent_mut(&seller_agent_id)
        .expect("seller exists at settlement");
    seller.cash += value - seller_fee;
    seller.asset -= quantity;

    let snapshot = |world: &World, id: AgentId| {
        let agent = world.agent(&id).expect("agent exists at settlement");
        BalanceUpdate {
            agent_id: id,
            cash: agent.cash,
            asset: agent.asset,
        }
    };
    (
        snapshot(world, buyer_agent_id),
        snapshot(world, seller_agent_id),
    )
}
