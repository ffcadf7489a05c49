//! The world state container

use std::collections::BTreeMap;

use types::agent::{Agent, AgentStatus};
use types::amount::Amount;
use types::config::RunConfig;
use types::ids::{AgentId, IdGenerator, OrderId, RunId};
use types::order::{Order, Side};
use types::trade::Trade;

use crate::book::{ask_priority, bid_priority, BookDepth, DepthLevel};

/// Root of all run-scoped mutable state. Owned exclusively by the kernel.
#[derive(Debug, Clone)]
pub struct World {
    config: RunConfig,
    run_id: RunId,
    seed: u64,
    ids: IdGenerator,
    agents: BTreeMap<AgentId, Agent>,
    /// Agent ids in creation order, for decay and bankruptcy sweeps.
    agent_order: Vec<AgentId>,
    /// Secondary index: API-key fingerprint → agent id.
    fingerprints: BTreeMap<String, AgentId>,
    orders: BTreeMap<OrderId, Order>,
    trades: Vec<Trade>,
    current_tick: u64,
    next_order_sequence: u64,
    total_volume: Amount,
    total_fees: Amount,
}

impl World {
    /// Create a fresh world. The run id is the generator's first draw, so
    /// it is itself a deterministic function of the seed.
    pub fn new(config: RunConfig, seed: u64) -> Self {
        let mut ids = IdGenerator::new(seed);
        let run_id = ids.next_run_id();
        Self {
            config,
            run_id,
            seed,
            ids,
            agents: BTreeMap::new(),
            agent_order: Vec::new(),
            fingerprints: BTreeMap::new(),
            orders: BTreeMap::new(),
            trades: Vec::new(),
            current_tick: 0,
            next_order_sequence: 0,
            total_volume: Amount::ZERO,
            total_fees: Amount::ZERO,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn increment_tick(&mut self) {
        self.current_tick += 1;
    }

    /// The deterministic id generator. The kernel is the only caller.
    pub fn ids_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    /// Claim the next global order sequence number.
    pub fn next_order_sequence(&mut self) -> u64 {
        let seq = self.next_order_sequence;
        self.next_order_sequence += 1;
        seq
    }

    // ── Agents ──────────────────────────────────────────────────────

    pub fn insert_agent(&mut self, agent: Agent) {
        self.fingerprints
            .insert(agent.api_key_fingerprint.clone(), agent.id);
        self.agent_order.push(agent.id);
        self.agents.insert(agent.id, agent);
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn agent_by_fingerprint(&self, fingerprint: &str) -> Option<&Agent> {
        self.fingerprints
            .get(fingerprint)
            .and_then(|id| self.agents.get(id))
    }

    /// Agent ids in creation order (snapshot).
    pub fn agent_ids_in_creation_order(&self) -> Vec<AgentId> {
        self.agent_order.clone()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn active_agent_count(&self) -> usize {
        self.agents
            .values()
            .filter(|a| a.status == AgentStatus::Active)
            .count()
    }

    pub fn bankrupt_agent_count(&self) -> usize {
        self.agents
            .values()
            .filter(|a| a.status == AgentStatus::Bankrupt)
            .count()
    }

    // ── Orders ──────────────────────────────────────────────────────

    pub fn insert_order(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn order_mut(&mut self, id: &OrderId) -> Option<&mut Order> {
        self.orders.get_mut(id)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// All orders of the run, in id order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Open orders of one agent, oldest first (value copies).
    pub fn open_orders_of(&self, agent_id: &AgentId) -> Vec<Order> {
        let mut open: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.agent_id == *agent_id && o.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|o| o.sequence);
        open
    }

    /// Ids of all open orders on one side, best-priority first.
    ///
    /// This is the documented ordering predicate applied on demand; the
    /// backing map is treated as unsorted storage.
    pub fn open_orders_on_side(&self, side: Side) -> Vec<OrderId> {
        let mut open: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| o.side == side && o.is_open())
            .collect();
        match side {
            Side::Bid => open.sort_by(|a, b| bid_priority(a, b)),
            Side::Ask => open.sort_by(|a, b| ask_priority(a, b)),
        }
        open.into_iter().map(|o| o.id).collect()
    }

    // ── Trades ──────────────────────────────────────────────────────

    /// Append an executed trade and fold it into the running totals.
    pub fn record_trade(&mut self, trade: Trade) {
        self.total_volume += trade.quantity;
        self.total_fees += trade.fee_total;
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// The most recent `limit` trades, newest last (value copies).
    pub fn recent_trades(&self, limit: usize) -> Vec<Trade> {
        let start = self.trades.len().saturating_sub(limit);
        self.trades[start..].to_vec()
    }

    pub fn total_volume(&self) -> Amount {
        self.total_volume
    }

    pub fn total_fees(&self) -> Amount {
        self.total_fees
    }

    // ── Book views ──────────────────────────────────────────────────

    /// Best (highest) open bid price.
    pub fn best_bid(&self) -> Option<Amount> {
        self.orders
            .values()
            .filter(|o| o.side == Side::Bid && o.is_open())
            .map(|o| o.price)
            .max()
    }

    /// Best (lowest) open ask price.
    pub fn best_ask(&self) -> Option<Amount> {
        self.orders
            .values()
            .filter(|o| o.side == Side::Ask && o.is_open())
            .map(|o| o.price)
            .min()
    }

    /// Mid price `(best_bid + best_ask) / 2`, when both sides are quoted.
    pub fn mid_price(&self) -> Option<Amount> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask).div(Amount::from_int(2))),
            _ => None,
        }
    }

    /// Spread `best_ask − best_bid`, when both sides are quoted.
    pub fn spread(&self) -> Option<Amount> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Aggregated book depth: top `levels` price levels per side, with the
    /// summed remaining quantity at each price. Computed from live orders —
    /// there is no cached book to drift out of sync.
    pub fn depth(&self, levels: usize) -> BookDepth {
        let mut bid_levels: BTreeMap<Amount, Amount> = BTreeMap::new();
        let mut ask_levels: BTreeMap<Amount, Amount> = BTreeMap::new();
        for order in self.orders.values().filter(|o| o.is_open()) {
            let side_levels = match order.side {
                Side::Bid => &mut bid_levels,
                Side::Ask => &mut ask_levels,
            };
            let entry = side_levels.entry(order.price).or_insert(Amount::ZERO);
            *entry += order.remaining();
        }

        BookDepth {
            bids: bid_levels
                .into_iter()
                .rev()
                .take(levels)
                .map(|(price, quantity)| DepthLevel { price, quantity })
                .collect(),
            asks: ask_levels
                .into_iter()
                .take(levels)
                .map(|(price, quantity)| DepthLevel { price, quantity })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_world() -> World {
        World::new(RunConfig::default(), 42)
    }

    fn add_agent(world: &mut World, name: &str) -> AgentId {
        let id = world.ids_mut().next_agent_id();
        let agent = Agent::new(
            id,
            name,
            format!("fp-{name}"),
            Amount::from_int(10_000),
            Amount::from_int(100),
        );
        world.insert_agent(agent);
        id
    }

    fn add_order(world: &mut World, agent: AgentId, side: Side, price: i64, qty: i64) -> OrderId {
        let id = world.ids_mut().next_order_id();
        let seq = world.next_order_sequence();
        let tick = world.current_tick();
        world.insert_order(Order::new(
            id,
            agent,
            side,
            Amount::from_int(price),
            Amount::from_int(qty),
            tick,
            seq,
        ));
        id
    }

    #[test]
    fn test_run_id_is_deterministic() {
        let a = test_world();
        let b = test_world();
        assert_eq!(a.run_id(), b.run_id());
    }

    #[test]
    fn test_agent_lookup_by_fingerprint() {
        let mut world = test_world();
        let id = add_agent(&mut world, "alice");
        assert_eq!(world.agent_by_fingerprint("fp-alice").unwrap().id, id);
        assert!(world.agent_by_fingerprint("fp-nobody").is_none());
    }

    #[test]
    fn test_creation_order_is_preserved() {
        let mut world = test_world();
        let a = add_agent(&mut world, "a");
        let b = add_agent(&mut world, "b");
        let c = add_agent(&mut world, "c");
        assert_eq!(world.agent_ids_in_creation_order(), vec![a, b, c]);
    }

    #[test]
    fn test_order_sequences_are_gapless() {
        let mut world = test_world();
        let agent = add_agent(&mut world, "a");
        for expected in 0..5u64 {
            let id = add_order(&mut world, agent, Side::Bid, 100, 1);
            assert_eq!(world.order(&id).unwrap().sequence, expected);
        }
    }

    #[test]
    fn test_best_bid_ask_mid_spread() {
        let mut world = test_world();
        let agent = add_agent(&mut world, "a");
        assert!(world.best_bid().is_none());
        assert!(world.mid_price().is_none());

        add_order(&mut world, agent, Side::Bid, 99, 1);
        add_order(&mut world, agent, Side::Bid, 98, 1);
        add_order(&mut world, agent, Side::Ask, 101, 1);
        add_order(&mut world, agent, Side::Ask, 102, 1);

        assert_eq!(world.best_bid(), Some(Amount::from_int(99)));
        assert_eq!(world.best_ask(), Some(Amount::from_int(101)));
        assert_eq!(world.mid_price(), Some(Amount::from_int(100)));
        assert_eq!(world.spread(), Some(Amount::from_int(2)));
    }

    #[test]
    fn test_depth_aggregates_per_price() {
        let mut world = test_world();
        let agent = add_agent(&mut world, "a");
        add_order(&mut world, agent, Side::Bid, 99, 2);
        add_order(&mut world, agent, Side::Bid, 99, 3);
        add_order(&mut world, agent, Side::Bid, 98, 1);
        add_order(&mut world, agent, Side::Ask, 101, 4);

        let depth = world.depth(10);
        assert_eq!(depth.bids.len(), 2);
        assert_eq!(depth.bids[0].price, Amount::from_int(99));
        assert_eq!(depth.bids[0].quantity, Amount::from_int(5));
        assert_eq!(depth.asks[0].price, Amount::from_int(101));
    }

    #[test]
    fn test_depth_respects_level_limit() {
        let mut world = test_world();
        let agent = add_agent(&mut world, "a");
        for p in 90..100 {
            add_order(&mut world, agent, Side::Bid, p, 1);
        }
        let depth = world.depth(3);
        assert_eq!(depth.bids.len(), 3);
        // Highest prices first
        assert_eq!(depth.bids[0].price, Amount::from_int(99));
        assert_eq!(depth.bids[2].price, Amount::from_int(97));
    }

    #[test]
    fn test_open_orders_on_side_priority() {
        let mut world = test_world();
        let agent = add_agent(&mut world, "a");
        let o1 = add_order(&mut world, agent, Side::Ask, 101, 1); // seq 0
        let o2 = add_order(&mut world, agent, Side::Ask, 100, 1); // seq 1
        let o3 = add_order(&mut world, agent, Side::Ask, 100, 1); // seq 2

        // Asks: price ascending, then sequence ascending
        assert_eq!(world.open_orders_on_side(Side::Ask), vec![o2, o3, o1]);
    }

    #[test]
    fn test_recent_trades_window() {
        let mut world = test_world();
        let agent = add_agent(&mut world, "a");
        let buy = add_order(&mut world, agent, Side::Bid, 100, 1);
        let sell = add_order(&mut world, agent, Side::Ask, 100, 1);
        for i in 0..5 {
            let id = world.ids_mut().next_trade_id();
            world.record_trade(Trade {
                id,
                tick: i,
                price: Amount::from_int(100),
                quantity: Amount::ONE,
                buyer_order_id: buy,
                seller_order_id: sell,
                buyer_agent_id: agent,
                seller_agent_id: agent,
                fee_total: Amount::ZERO,
                aggressor: Side::Bid,
            });
        }
        let recent = world.recent_trades(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tick, 3);
        assert_eq!(world.total_volume(), Amount::from_int(5));
    }

    #[test]
    fn test_agent_status_counts() {
        let mut world = test_world();
        let a = add_agent(&mut world, "a");
        add_agent(&mut world, "b");
        assert_eq!(world.active_agent_count(), 2);
        world.agent_mut(&a).unwrap().mark_bankrupt(1);
        assert_eq!(world.active_agent_count(), 1);
        assert_eq!(world.bankrupt_agent_count(), 1);
    }
}
