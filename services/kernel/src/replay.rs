//! World reconstruction from a verified event log
//!
//! Replays a chain from GENESIS into a fresh world whose queryable
//! projections (balances, open orders, book depth, tick) match the
//! original's. The chain is verified first; a log that fails verification
//! is never applied.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use event_store::{Event, EventStore, EventType};
use matching_engine::BalanceUpdate;
use types::agent::Agent;
use types::amount::Amount;
use types::config::RunConfig;
use types::ids::{AgentId, OrderId};
use types::order::{Order, Side};
use types::trade::Trade;
use world::World;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("hash chain mismatch at event index {index}")]
    ChainInvalid { index: usize },

    #[error("log does not begin with RUN_CREATED")]
    MissingRunCreated,

    #[error("malformed payload at event seq {seq}: {detail}")]
    MalformedPayload { seq: u64, detail: String },
}

/// Rebuild a world from the full event log of a run.
pub fn replay(store: &EventStore) -> Result<World, ReplayError> {
    if let event_store::ChainVerification::MismatchAt(index) = store.verify_chain() {
        return Err(ReplayError::ChainInvalid { index });
    }

    let events = store.events();
    let first = events.first().ok_or(ReplayError::MissingRunCreated)?;
    if first.event_type != EventType::RunCreated {
        return Err(ReplayError::MissingRunCreated);
    }
    let config: RunConfig = field(first, "config")?;
    let seed: u64 = field(first, "seed")?;
    let mut world = World::new(config, seed);

    for event in events {
        apply(&mut world, event)?;
    }
    Ok(world)
}

fn apply(world: &mut World, event: &Event) -> Result<(), ReplayError> {
    match event.event_type {
        EventType::AgentCreated => {
            let agent_id: AgentId = field(event, "agent_id")?;
            let name: String = field(event, "name")?;
            let fingerprint: String = field(event, "api_key_fingerprint")?;
            let cash: Amount = field(event, "cash")?;
            let asset: Amount = field(event, "asset")?;
            world.insert_agent(Agent::new(agent_id, name, fingerprint, cash, asset));
        }
        EventType::OrderPlaced => {
            let order_id: OrderId = field(event, "order_id")?;
            let agent_id: AgentId = field(event, "agent_id")?;
            let side: Side = field(event, "side")?;
            let price: Amount = field(event, "price")?;
            let quantity: Amount = field(event, "quantity")?;
            let sequence: u64 = field(event, "sequence")?;
            let tick_created: u64 = field(event, "tick_created")?;
            world.insert_order(Order::new(
                order_id,
                agent_id,
                side,
                price,
                quantity,
                tick_created,
                sequence,
            ));
        }
        EventType::TradeExecuted => {
            let trade: Trade = parse(event, &event.payload)?;
            fill_order(world, event, &trade.buyer_order_id, trade.quantity)?;
            fill_order(world, event, &trade.seller_order_id, trade.quantity)?;
            world.record_trade(trade);
        }
        EventType::BalanceUpdated => {
            let update: BalanceUpdate = parse(event, &event.payload)?;
            let agent = world.agent_mut(&update.agent_id).ok_or_else(|| malformed(
                event,
                format!("balance update for unknown agent {}", update.agent_id),
            ))?;
            agent.cash = update.cash;
            agent.asset = update.asset;
        }
        EventType::OrderCancelled => {
            let order_id: OrderId = field(event, "order_id")?;
            let order = world.order_mut(&order_id).ok_or_else(|| {
                malformed(event, format!("cancellation of unknown order {order_id}"))
            })?;
            order.cancel();
        }
        EventType::DecayApplied => {
            let agent_id: AgentId = field(event, "agent_id")?;
            let cash_after: Amount = field(event, "cash_after")?;
            let agent = world.agent_mut(&agent_id).ok_or_else(|| {
                malformed(event, format!("decay for unknown agent {agent_id}"))
            })?;
            agent.cash = cash_after;
        }
        EventType::AgentBankrupt => {
            let agent_id: AgentId = field(event, "agent_id")?;
            let tick_id: u64 = field(event, "tick_id")?;
            for order in world.open_orders_of(&agent_id) {
                if let Some(order) = world.order_mut(&order.id) {
                    order.cancel();
                }
            }
            let agent = world.agent_mut(&agent_id).ok_or_else(|| {
                malformed(event, format!("bankruptcy of unknown agent {agent_id}"))
            })?;
            agent.mark_bankrupt(tick_id);
        }
        EventType::TickEnd => {
            world.increment_tick();
        }
        // Lifecycle markers and rejections carry no state.
        EventType::RunCreated
        | EventType::RunStarted
        | EventType::RunStopped
        | EventType::TickStart
        | EventType::OrderRejected
        | EventType::RateLimitHit => {}
    }
    Ok(())
}

fn fill_order(
    world: &mut World,
    event: &Event,
    order_id: &OrderId,
    quantity: Amount,
) -> Result<(), ReplayError> {
    let order = world
        .order_mut(order_id)
        .ok_or_else(|| malformed(event, format!("trade references unknown order {order_id}")))?;
    order.fill(quantity);
    Ok(())
}

fn field<T: DeserializeOwned>(event: &Event, key: &str) -> Result<T, ReplayError> {
    let value = event
        .payload
        .get(key)
        .ok_or_else(|| malformed(event, format!("missing field {key:?}")))?;
    parse(event, value)
}

fn parse<T: DeserializeOwned>(event: &Event, value: &Value) -> Result<T, ReplayError> {
    serde_json::from_value(value.clone()).map_err(|e| malformed(event, e.to_string()))
}

fn malformed(event: &Event, detail: String) -> ReplayError {
    ReplayError::MalformedPayload {
        seq: event.seq,
        detail,
    }
}
