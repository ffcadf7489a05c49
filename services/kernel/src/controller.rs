//! Run lifecycle, action intake, and tick advancement

use serde_json::json;
use tracing::{debug, info, warn};

use event_store::{EventStore, EventType};
use matching_engine::{cancel_order, place_limit_order};
use types::action::{Action, ActionResult, ReasonCode, SubmitOutcome};
use types::agent::Agent;
use types::config::RunConfig;
use types::errors::KernelError;
use types::ids::{AgentId, OrderId, RunId};
use world::World;

use crate::idempotency::IdempotencyCache;

/// Run lifecycle state machine: `created → running → stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Created,
    Running,
    Stopped,
}

/// Summary returned by `advance_tick`, mirrored in the `TICK_END` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub tick_id: u64,
    /// Queued actions processed this tick (placements and cancellations).
    pub orders_processed: u64,
    pub trades_executed: u64,
}

/// One queued action awaiting the next tick advance.
#[derive(Debug, Clone)]
struct PendingAction {
    agent_id: AgentId,
    action: Action,
    receive_seq: u64,
    /// Pre-drawn at acceptance for placements, so the id reported to the
    /// submitter is the id the order will carry.
    order_id: Option<OrderId>,
}

/// The simulation kernel. Exclusive owner of world state and event store.
///
/// All entry points are synchronous and run to completion; callers must
/// serialize access (single-owner lock or message queue). Queries observe
/// the world between actions, never mid-action.
pub struct SimKernel {
    world: World,
    store: EventStore,
    cache: IdempotencyCache,
    pending: Vec<PendingAction>,
    next_receive_seq: u64,
    state: RunState,
}

impl SimKernel {
    /// Create a run. Emits `RUN_CREATED` with the serialized config
    /// (amounts as decimal strings) and the seed.
    pub fn new(config: RunConfig, seed: u64) -> Self {
        let world = World::new(config.clone(), seed);
        let mut store = EventStore::new(world.run_id());
        store.append(
            0,
            EventType::RunCreated,
            None,
            json!({ "config": config, "seed": seed }),
        );
        info!(run_id = %world.run_id(), seed, "run created");
        Self {
            world,
            store,
            cache: IdempotencyCache::new(),
            pending: Vec::new(),
            next_receive_seq: 0,
            state: RunState::Created,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.world.run_id()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Read-only view of the world. Collection-returning queries on it
    /// yield value copies.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only view of the event log.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Open the run for action submission. Emits `RUN_STARTED`.
    pub fn start(&mut self) -> Result<(), KernelError> {
        if self.state != RunState::Created {
            return Err(KernelError::AlreadyRunning);
        }
        self.state = RunState::Running;
        let tick_id = self.world.current_tick();
        self.emit(EventType::RunStarted, None, json!({ "tick_id": tick_id }));
        info!(run_id = %self.world.run_id(), "run started");
        Ok(())
    }

    /// Irreversibly disable action submission. Emits `RUN_STOPPED`.
    pub fn stop(&mut self, reason: &str) -> Result<(), KernelError> {
        if self.state != RunState::Running {
            return Err(KernelError::NotRunning);
        }
        self.state = RunState::Stopped;
        let tick_id = self.world.current_tick();
        self.emit(
            EventType::RunStopped,
            None,
            json!({ "tick_id": tick_id, "reason": reason }),
        );
        info!(run_id = %self.world.run_id(), reason, "run stopped");
        Ok(())
    }

    // ── Agents ──────────────────────────────────────────────────────

    /// Register an agent with the configured opening balances.
    ///
    /// The plaintext API key (fixed `ak_` prefix) is returned exactly once;
    /// only its SHA-256 fingerprint is stored. Emits `AGENT_CREATED`.
    pub fn create_agent(&mut self, name: &str) -> Result<(AgentId, String), KernelError> {
        if self.state == RunState::Stopped {
            return Err(KernelError::NotRunning);
        }
        let agent_id = self.world.ids_mut().next_agent_id();
        let api_key = format!("ak_{}", self.world.ids_mut().next_uuid().simple());
        let fingerprint = canonical::sha256_hex(api_key.as_bytes());

        let config = self.world.config();
        let agent = Agent::new(
            agent_id,
            name,
            fingerprint.clone(),
            config.initial_cash,
            config.initial_asset,
        );
        let payload = json!({
            "agent_id": agent.id,
            "name": agent.name,
            "api_key_fingerprint": agent.api_key_fingerprint,
            "cash": agent.cash,
            "asset": agent.asset,
        });
        self.world.insert_agent(agent);
        self.emit(EventType::AgentCreated, Some(agent_id), payload);
        debug!(%agent_id, name, "agent created");
        Ok((agent_id, api_key))
    }

    // ── Action intake ───────────────────────────────────────────────

    /// Accept a batch of actions into the queue for the current tick.
    ///
    /// Never fails across the boundary: every outcome is a structured
    /// result, cached under `idempotency_key`. A repeated key returns the
    /// cached outcome verbatim with zero side effects. Receive-sequence
    /// assignment is atomic with the queue append — the kernel is a
    /// single-threaded actor, so the hand-out order is the processing
    /// order.
    pub fn submit_actions(
        &mut self,
        agent_id: &AgentId,
        actions: &[Action],
        idempotency_key: &str,
    ) -> SubmitOutcome {
        if let Some(cached) = self.cache.get(idempotency_key) {
            debug!(idempotency_key, "returning cached submission outcome");
            return cached.clone();
        }

        let tick_id = self.world.current_tick();
        if self.state != RunState::Running {
            return self.cache_rejection(
                idempotency_key,
                tick_id,
                ReasonCode::RunNotActive,
                "run is not active",
            );
        }
        match self.world.agent(agent_id).map(|a| a.is_bankrupt()) {
            None => {
                return self.cache_rejection(
                    idempotency_key,
                    tick_id,
                    ReasonCode::InvalidAction,
                    format!("unknown agent {agent_id}"),
                );
            }
            Some(true) => {
                return self.cache_rejection(
                    idempotency_key,
                    tick_id,
                    ReasonCode::AgentBankrupt,
                    "agent is bankrupt",
                );
            }
            Some(false) => {}
        }

        let max_actions = self.world.config().max_actions_per_tick;
        let mut results = Vec::with_capacity(actions.len());
        for (index, action) in actions.iter().enumerate() {
            let used = self
                .world
                .agent(agent_id)
                .map(|a| a.actions_this_tick)
                .unwrap_or(0);
            if used >= max_actions {
                warn!(%agent_id, tick_id, index, "rate limit hit");
                self.emit(
                    EventType::RateLimitHit,
                    Some(*agent_id),
                    json!({ "agent_id": agent_id, "tick_id": tick_id, "action_index": index }),
                );
                results.push(ActionResult::rejected(
                    index,
                    ReasonCode::RateLimited,
                    format!("max {max_actions} actions per tick"),
                ));
                continue;
            }

            let receive_seq = self.next_receive_seq;
            self.next_receive_seq += 1;
            let order_id = match action {
                Action::PlaceLimitOrder { .. } => Some(self.world.ids_mut().next_order_id()),
                Action::CancelOrder { .. } => None,
            };
            self.pending.push(PendingAction {
                agent_id: *agent_id,
                action: action.clone(),
                receive_seq,
                order_id,
            });
            if let Some(agent) = self.world.agent_mut(agent_id) {
                agent.actions_this_tick += 1;
            }
            results.push(ActionResult::accepted(index, order_id));
        }

        let outcome = SubmitOutcome { tick_id, results };
        self.cache.insert(idempotency_key, outcome.clone());
        outcome
    }

    // ── Tick advancement ────────────────────────────────────────────

    /// Drain the queue in receive-sequence order, dispatching each action
    /// to the matching engine, then apply decay, sweep bankruptcies, and
    /// close the tick with `TICK_END`.
    pub fn advance_tick(&mut self) -> Result<TickSummary, KernelError> {
        if self.state != RunState::Running {
            return Err(KernelError::NotRunning);
        }
        let tick_id = self.world.current_tick();
        self.emit(EventType::TickStart, None, json!({ "tick_id": tick_id }));

        for agent_id in self.world.agent_ids_in_creation_order() {
            if let Some(agent) = self.world.agent_mut(&agent_id) {
                agent.actions_this_tick = 0;
            }
        }

        let mut queue = std::mem::take(&mut self.pending);
        // The queue is appended in sequence order already; the explicit
        // sort documents the ordering contract.
        queue.sort_by_key(|p| p.receive_seq);

        let orders_processed = queue.len() as u64;
        let mut trades_executed = 0u64;
        for pending in queue {
            trades_executed += self.process_action(pending);
        }

        self.apply_decay(tick_id);
        self.sweep_bankruptcies(tick_id);

        self.emit(
            EventType::TickEnd,
            None,
            json!({
                "tick_id": tick_id,
                "orders_processed": orders_processed,
                "trades_executed": trades_executed,
            }),
        );
        self.world.increment_tick();
        self.cache.flush_if_due(self.world.current_tick());
        info!(tick_id, orders_processed, trades_executed, "tick advanced");

        Ok(TickSummary {
            tick_id,
            orders_processed,
            trades_executed,
        })
    }

    /// Dispatch one queued action. Returns the number of trades executed.
    fn process_action(&mut self, pending: PendingAction) -> u64 {
        let agent_id = pending.agent_id;
        match pending.action {
            Action::PlaceLimitOrder {
                side,
                ref price,
                ref quantity,
            } => {
                let order_id = pending.order_id.expect("placement carries a pre-drawn id");
                let fee_bps = self.world.config().trading_fee_bps;
                match place_limit_order(
                    &mut self.world,
                    &agent_id,
                    order_id,
                    side,
                    price,
                    quantity,
                    fee_bps,
                ) {
                    Ok(report) => {
                        let order = self
                            .world
                            .order(&report.order_id)
                            .cloned()
                            .expect("placed order exists");
                        self.emit(
                            EventType::OrderPlaced,
                            Some(agent_id),
                            json!({
                                "order_id": order.id,
                                "agent_id": order.agent_id,
                                "side": order.side,
                                "price": order.price,
                                "quantity": order.quantity,
                                "sequence": order.sequence,
                                "tick_created": order.tick_created,
                            }),
                        );
                        for trade in &report.trades {
                            let aggressor_agent = match trade.aggressor {
                                types::order::Side::Bid => trade.buyer_agent_id,
                                types::order::Side::Ask => trade.seller_agent_id,
                            };
                            self.emit(
                                EventType::TradeExecuted,
                                Some(aggressor_agent),
                                serde_json::to_value(trade).expect("trade serializes"),
                            );
                        }
                        for update in &report.balance_updates {
                            self.emit(
                                EventType::BalanceUpdated,
                                Some(update.agent_id),
                                serde_json::to_value(update).expect("balance update serializes"),
                            );
                        }
                        report.trades.len() as u64
                    }
                    Err(err) => {
                        self.emit(
                            EventType::OrderRejected,
                            Some(agent_id),
                            json!({
                                "agent_id": agent_id,
                                "order_id": order_id,
                                "reason_code": err.reason_code(),
                                "message": err.to_string(),
                            }),
                        );
                        0
                    }
                }
            }
            Action::CancelOrder { order_id } => {
                match cancel_order(&mut self.world, &agent_id, &order_id) {
                    Ok(report) => {
                        self.emit(
                            EventType::OrderCancelled,
                            Some(agent_id),
                            json!({
                                "order_id": report.order_id,
                                "agent_id": agent_id,
                                "remaining": report.remaining,
                            }),
                        );
                    }
                    Err(err) => {
                        self.emit(
                            EventType::OrderRejected,
                            Some(agent_id),
                            json!({
                                "agent_id": agent_id,
                                "order_id": order_id,
                                "reason_code": err.reason_code(),
                                "message": err.to_string(),
                            }),
                        );
                    }
                }
                0
            }
        }
    }

    /// Periodic cash decay: active agents with positive cash, insertion
    /// order. Zero- and negative-cash agents are untouched.
    fn apply_decay(&mut self, tick_id: u64) {
        let interval = self.world.config().decay_interval_ticks;
        let rate_bps = self.world.config().decay_rate_bps;
        if interval == 0 || tick_id == 0 || tick_id % interval != 0 {
            return;
        }
        for agent_id in self.world.agent_ids_in_creation_order() {
            let Some(agent) = self.world.agent(&agent_id) else {
                continue;
            };
            if !agent.is_active() || !agent.cash.is_positive() {
                continue;
            }
            let amount = agent.cash.mul_bps(rate_bps);
            let agent = self
                .world
                .agent_mut(&agent_id)
                .expect("agent exists during decay");
            agent.cash -= amount;
            let cash_after = agent.cash;
            self.emit(
                EventType::DecayApplied,
                Some(agent_id),
                json!({
                    "agent_id": agent_id,
                    "amount": amount,
                    "cash_after": cash_after,
                }),
            );
        }
    }

    /// Mark every active agent with negative cash bankrupt: its open
    /// orders are cancelled in place (no per-order events — the bankruptcy
    /// event subsumes them) and `AGENT_BANKRUPT` is emitted.
    fn sweep_bankruptcies(&mut self, tick_id: u64) {
        for agent_id in self.world.agent_ids_in_creation_order() {
            let Some(agent) = self.world.agent(&agent_id) else {
                continue;
            };
            if !agent.is_active() || !agent.cash.is_negative() {
                continue;
            }
            for order in self.world.open_orders_of(&agent_id) {
                self.world
                    .order_mut(&order.id)
                    .expect("open order exists")
                    .cancel();
            }
            let agent = self
                .world
                .agent_mut(&agent_id)
                .expect("agent exists during sweep");
            agent.mark_bankrupt(tick_id);
            let cash = agent.cash;
            warn!(%agent_id, tick_id, %cash, "agent bankrupt");
            self.emit(
                EventType::AgentBankrupt,
                Some(agent_id),
                json!({
                    "agent_id": agent_id,
                    "tick_id": tick_id,
                    "cash": cash,
                }),
            );
        }
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn emit(&mut self, event_type: EventType, agent_id: Option<AgentId>, payload: serde_json::Value) {
        let tick_id = self.world.current_tick();
        self.store.append(tick_id, event_type, agent_id, payload);
    }

    fn cache_rejection(
        &mut self,
        idempotency_key: &str,
        tick_id: u64,
        reason: ReasonCode,
        message: impl Into<String>,
    ) -> SubmitOutcome {
        let outcome = SubmitOutcome {
            tick_id,
            results: vec![ActionResult::rejected(0, reason, message)],
        };
        self.cache.insert(idempotency_key, outcome.clone());
        outcome
    }
}
