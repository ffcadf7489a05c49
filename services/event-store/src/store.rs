//! Append-only store with hash chaining and verification

use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use types::ids::{AgentId, RunId};

use crate::event::{Event, EventType};

/// The fixed prev-hash of the first event.
pub const GENESIS: &str = "GENESIS";

/// Result of a full chain verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainVerification {
    Valid,
    /// Zero-based index of the first event whose recomputed hash disagrees
    /// with the stored chain.
    MismatchAt(usize),
}

impl ChainVerification {
    pub fn is_valid(&self) -> bool {
        *self == ChainVerification::Valid
    }
}

/// Append-only event sequence with a running last-hash.
#[derive(Debug, Clone)]
pub struct EventStore {
    run_id: RunId,
    events: Vec<Event>,
    last_hash: String,
}

impl EventStore {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            events: Vec::new(),
            last_hash: GENESIS.to_string(),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Append an event: assign the next sequence, chain the hash, advance
    /// the running last-hash.
    pub fn append(
        &mut self,
        tick_id: u64,
        event_type: EventType,
        agent_id: Option<AgentId>,
        payload: Value,
    ) -> &Event {
        let seq = self.events.len() as u64;
        let prev_hash = self.last_hash.clone();
        let event_hash = canonical::hash_value(&Event::hash_input(
            self.run_id,
            tick_id,
            seq,
            event_type,
            agent_id,
            &payload,
            &prev_hash,
        ));
        self.last_hash = event_hash.clone();
        self.events.push(Event {
            id: seq + 1,
            run_id: self.run_id,
            tick_id,
            seq,
            event_type,
            agent_id,
            payload,
            prev_hash,
            event_hash,
            created_at: now_nanos(),
        });
        self.events.last().expect("event just pushed")
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }

    /// Events of one type (value copies).
    pub fn by_type(&self, event_type: EventType) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Events scoped to one agent (value copies).
    pub fn by_agent(&self, agent_id: &AgentId) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id.as_ref() == Some(agent_id))
            .cloned()
            .collect()
    }

    /// Events of one tick (value copies).
    pub fn by_tick(&self, tick_id: u64) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.tick_id == tick_id)
            .cloned()
            .collect()
    }

    /// Recompute every hash from GENESIS and compare against the stored
    /// chain. Stored hashes are never trusted as inputs to later links —
    /// each link is verified against the recomputed predecessor.
    pub fn verify_chain(&self) -> ChainVerification {
        let mut prev = GENESIS.to_string();
        for (index, event) in self.events.iter().enumerate() {
            if event.seq != index as u64 || event.prev_hash != prev {
                return ChainVerification::MismatchAt(index);
            }
            let recomputed = event.compute_hash(&prev);
            if recomputed != event.event_hash {
                return ChainVerification::MismatchAt(index);
            }
            prev = recomputed;
        }
        ChainVerification::Valid
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use types::ids::IdGenerator;

    fn test_store() -> EventStore {
        let mut gen = IdGenerator::new(7);
        EventStore::new(gen.next_run_id())
    }

    fn fill(store: &mut EventStore, count: u64) {
        for i in 0..count {
            store.append(i / 4, EventType::TickStart, None, json!({"i": i}));
        }
    }

    #[test]
    fn test_first_event_chains_from_genesis() {
        let mut store = test_store();
        let event = store.append(0, EventType::RunCreated, None, json!({"seed": 7}));
        assert_eq!(event.prev_hash, GENESIS);
        assert_eq!(event.seq, 0);
        assert_eq!(event.id, 1);
        assert_eq!(event.event_hash.len(), 64);
    }

    #[test]
    fn test_sequences_are_gapless() {
        let mut store = test_store();
        fill(&mut store, 10);
        for (i, event) in store.events().iter().enumerate() {
            assert_eq!(event.seq, i as u64);
            assert_eq!(event.id, i as u64 + 1);
        }
    }

    #[test]
    fn test_last_hash_advances() {
        let mut store = test_store();
        assert_eq!(store.last_hash(), GENESIS);
        let first_hash = store
            .append(0, EventType::RunCreated, None, json!({}))
            .event_hash
            .clone();
        assert_eq!(store.last_hash(), first_hash);
        store.append(0, EventType::RunStarted, None, json!({}));
        assert_ne!(store.last_hash(), first_hash);
    }

    #[test]
    fn test_verify_chain_valid() {
        let mut store = test_store();
        fill(&mut store, 25);
        assert!(store.verify_chain().is_valid());
    }

    #[test]
    fn test_verify_empty_chain_valid() {
        let store = test_store();
        assert!(store.verify_chain().is_valid());
    }

    #[test]
    fn test_tampered_payload_is_detected() {
        let mut store = test_store();
        fill(&mut store, 10);
        // Reach into the log and flip a payload.
        let mut tampered = store.clone();
        tampered.events[4].payload = json!({"i": 999});
        assert_eq!(
            tampered.verify_chain(),
            ChainVerification::MismatchAt(4)
        );
    }

    #[test]
    fn test_tampered_stored_hash_is_detected() {
        let mut store = test_store();
        fill(&mut store, 6);
        let mut tampered = store.clone();
        tampered.events[2].event_hash = "0".repeat(64);
        assert_eq!(
            tampered.verify_chain(),
            ChainVerification::MismatchAt(2)
        );
    }

    #[test]
    fn test_broken_link_is_detected_at_break() {
        let mut store = test_store();
        fill(&mut store, 6);
        let mut tampered = store.clone();
        tampered.events[3].prev_hash = "not-the-real-hash".to_string();
        assert_eq!(
            tampered.verify_chain(),
            ChainVerification::MismatchAt(3)
        );
    }

    #[test]
    fn test_created_at_does_not_affect_chain() {
        let mut store = test_store();
        fill(&mut store, 5);
        let mut altered = store.clone();
        for event in &mut altered.events {
            event.created_at = 0;
        }
        assert!(altered.verify_chain().is_valid());
        assert_eq!(altered.last_hash(), store.last_hash());
    }

    #[test]
    fn test_queries() {
        let mut store = test_store();
        let mut gen = IdGenerator::new(8);
        let agent = gen.next_agent_id();
        store.append(0, EventType::RunCreated, None, json!({}));
        store.append(0, EventType::AgentCreated, Some(agent), json!({}));
        store.append(1, EventType::TickStart, None, json!({}));
        store.append(1, EventType::RateLimitHit, Some(agent), json!({}));

        assert_eq!(store.by_type(EventType::TickStart).len(), 1);
        assert_eq!(store.by_agent(&agent).len(), 2);
        assert_eq!(store.by_tick(1).len(), 2);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_identical_inputs_identical_last_hash() {
        let mut a = test_store();
        let mut b = test_store();
        fill(&mut a, 30);
        fill(&mut b, 30);
        assert_eq!(a.last_hash(), b.last_hash());
    }
}
