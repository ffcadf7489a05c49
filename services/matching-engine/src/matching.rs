//! Order placement, validation, matching, and cancellation

use tracing::{debug, trace};
use types::amount::Amount;
use types::errors::ActionError;
use types::ids::{AgentId, OrderId};
use types::order::{Order, Side};
use types::trade::Trade;
use world::World;

use crate::settlement::{settle_trade, split_fee, BalanceUpdate};

/// Outcome of an accepted placement.
///
/// `balance_updates` holds buyer-then-seller snapshots per trade, in trade
/// order, ready for event emission.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementReport {
    pub order_id: OrderId,
    pub trades: Vec<Trade>,
    pub balance_updates: Vec<BalanceUpdate>,
}

/// Outcome of a successful cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelReport {
    pub order_id: OrderId,
    pub remaining: Amount,
}

/// Place a limit order and match it immediately.
///
/// `order_id` is pre-drawn by the kernel when the action is accepted into
/// the queue, so the id an agent saw at submission is the id the order
/// carries. Validation order is fixed; the first failure wins:
/// parse → price bounds → quantity floor → agent exists/active → solvency.
///
/// The solvency check gates the order as a whole but escrows nothing —
/// balances move only as fills settle.
pub fn place_limit_order(
    world: &mut World,
    agent_id: &AgentId,
    order_id: OrderId,
    side: Side,
    price_str: &str,
    quantity_str: &str,
    fee_bps: i64,
) -> Result<PlacementReport, ActionError> {
    let price = Amount::parse(price_str)
        .map_err(|e| ActionError::InvalidAction(e.to_string()))?;
    let quantity = Amount::parse(quantity_str)
        .map_err(|e| ActionError::InvalidAction(e.to_string()))?;

    let config = world.config();
    if !price.is_positive() || price < config.min_price || price > config.max_price {
        return Err(ActionError::InvalidPrice(format!(
            "price {price} outside [{}, {}]",
            config.min_price, config.max_price
        )));
    }
    if !quantity.is_positive() || quantity < config.min_quantity {
        return Err(ActionError::InvalidQuantity(format!(
            "quantity {quantity} below minimum {}",
            config.min_quantity
        )));
    }

    let agent = world
        .agent(agent_id)
        .ok_or_else(|| ActionError::InvalidAction(format!("unknown agent {agent_id}")))?;
    if !agent.is_active() {
        return Err(ActionError::AgentBankrupt);
    }

    match side {
        Side::Bid => {
            let required = price.mul(quantity);
            if agent.cash < required {
                return Err(ActionError::InsufficientFunds {
                    required: required.to_string(),
                    available: agent.cash.to_string(),
                });
            }
        }
        Side::Ask => {
            if agent.asset < quantity {
                return Err(ActionError::InsufficientFunds {
                    required: quantity.to_string(),
                    available: agent.asset.to_string(),
                });
            }
        }
    }

    let sequence = world.next_order_sequence();
    let tick = world.current_tick();
    world.insert_order(Order::new(
        order_id, *agent_id, side, price, quantity, tick, sequence,
    ));
    debug!(%order_id, side = side.as_str(), %price, %quantity, sequence, "order placed");

    let (trades, balance_updates) = match_incoming(world, order_id, side, fee_bps);
    Ok(PlacementReport {
        order_id,
        trades,
        balance_updates,
    })
}

/// Walk the opposite side in priority order and clear every crossing.
fn match_incoming(
    world: &mut World,
    incoming_id: OrderId,
    incoming_side: Side,
    fee_bps: i64,
) -> (Vec<Trade>, Vec<BalanceUpdate>) {
    let mut trades = Vec::new();
    let mut balance_updates = Vec::new();

    // Snapshot of the opposite side in priority order. Fills never add
    // opposite orders, so the snapshot stays exhaustive for this placement.
    let opposite = world.open_orders_on_side(incoming_side.opposite());

    for resting_id in opposite {
        let incoming = world.order(&incoming_id).expect("incoming order exists");
        if !incoming.is_open() {
            break;
        }
        let resting = world.order(&resting_id).expect("resting order exists");
        if !resting.is_open() {
            continue;
        }

        let crosses = match incoming_side {
            Side::Bid => incoming.price >= resting.price,
            Side::Ask => incoming.price <= resting.price,
        };
        if !crosses {
            // Priority order: once the best resting no longer crosses,
            // nothing further will.
            break;
        }

        let fill = incoming.remaining().min(resting.remaining());
        // Execution at the resting limit; the aggressor keeps the
        // improvement.
        let trade_price = resting.price;
        let value = trade_price.mul(fill);
        let fee_total = value.mul_bps(fee_bps);
        let (buyer_fee, seller_fee) = split_fee(fee_total);

        let (buyer_order_id, seller_order_id) = match incoming_side {
            Side::Bid => (incoming_id, resting_id),
            Side::Ask => (resting_id, incoming_id),
        };
        let buyer_agent_id = world
            .order(&buyer_order_id)
            .expect("buyer order exists")
            .agent_id;
        let seller_agent_id = world
            .order(&seller_order_id)
            .expect("seller order exists")
            .agent_id;

        world
            .order_mut(&incoming_id)
            .expect("incoming order exists")
            .fill(fill);
        world
            .order_mut(&resting_id)
            .expect("resting order exists")
            .fill(fill);

        let (buyer_update, seller_update) = settle_trade(
            world,
            buyer_agent_id,
            seller_agent_id,
            value,
            fill,
            buyer_fee,
            seller_fee,
        );

        let trade = Trade {
            id: world.ids_mut().next_trade_id(),
            tick: world.current_tick(),
            price: trade_price,
            quantity: fill,
            buyer_order_id,
            seller_order_id,
            buyer_agent_id,
            seller_agent_id,
            fee_total,
            aggressor: incoming_side,
        };
        trace!(trade_id = %trade.id, %trade_price, %fill, "trade executed");
        world.record_trade(trade.clone());
        trades.push(trade);
        balance_updates.push(buyer_update);
        balance_updates.push(seller_update);
    }

    (trades, balance_updates)
}

/// Cancel an open order.
///
/// The order must exist and be open (`OrderNotFound` otherwise) and belong
/// to the caller (`OrderNotOwned`). No balances change — nothing was
/// escrowed at placement.
pub fn cancel_order(
    world: &mut World,
    agent_id: &AgentId,
    order_id: &OrderId,
) -> Result<CancelReport, ActionError> {
    let order = world.order(order_id).ok_or(ActionError::OrderNotFound {
        order_id: order_id.to_string(),
    })?;
    if order.agent_id != *agent_id {
        return Err(ActionError::OrderNotOwned {
            order_id: order_id.to_string(),
        });
    }
    if !order.is_open() {
        return Err(ActionError::OrderNotFound {
            order_id: order_id.to_string(),
        });
    }

    let remaining = order.remaining();
    world
        .order_mut(order_id)
        .expect("order exists")
        .cancel();
    debug!(%order_id, %remaining, "order cancelled");
    Ok(CancelReport {
        order_id: *order_id,
        remaining,
    })
}
