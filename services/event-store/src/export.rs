//! Canonical JSONL export
//!
//! One canonical JSON event per line: the hash-input fields plus `id` and
//! `event_hash`. `created_at` is excluded — downstream stores may attach
//! their own metadata, but altering any canonical field breaks the chain.

use serde_json::json;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::event::Event;
use crate::store::EventStore;

/// Render one event as its canonical export line (no trailing newline).
pub fn export_line(event: &Event) -> String {
    canonical::canonical_json(&json!({
        "id": event.id,
        "run_id": event.run_id,
        "tick_id": event.tick_id,
        "event_seq": event.seq,
        "event_type": event.event_type,
        "agent_id": event.agent_id,
        "payload": event.payload,
        "prev_hash": event.prev_hash,
        "event_hash": event.event_hash,
    }))
}

/// Write the full log, one canonical line per event.
pub fn export_to_writer<W: Write>(store: &EventStore, writer: &mut W) -> io::Result<()> {
    for event in store.events() {
        writer.write_all(export_line(event).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Write the full log to a file path.
pub fn export_to_file(store: &EventStore, path: impl AsRef<Path>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    export_to_writer(store, &mut writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use serde_json::{json, Value};
    use types::ids::IdGenerator;

    fn sample_store() -> EventStore {
        let mut gen = IdGenerator::new(21);
        let mut store = EventStore::new(gen.next_run_id());
        store.append(0, EventType::RunCreated, None, json!({"seed": 21}));
        store.append(0, EventType::RunStarted, None, json!({}));
        store.append(0, EventType::TickStart, None, json!({"tick_id": 0}));
        store
    }

    #[test]
    fn test_export_line_is_canonical_and_complete() {
        let store = sample_store();
        let line = export_line(&store.events()[0]);
        assert!(!line.contains('\n'));
        assert!(!line.contains("created_at"));
        assert!(line.contains("\"prev_hash\":\"GENESIS\""));

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event_type"], "RUN_CREATED");
        assert_eq!(parsed["event_seq"], 0);
        assert_eq!(parsed["id"], 1);
    }

    #[test]
    fn test_export_writer_one_line_per_event() {
        let store = sample_store();
        let mut buf = Vec::new();
        export_to_writer(&store, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let parsed: Value = serde_json::from_str(line).unwrap();
            assert!(parsed["event_hash"].is_string());
        }
    }

    #[test]
    fn test_export_is_deterministic() {
        let a = sample_store();
        let b = sample_store();
        let mut buf_a = Vec::new();
        let mut buf_b = Vec::new();
        export_to_writer(&a, &mut buf_a).unwrap();
        export_to_writer(&b, &mut buf_b).unwrap();
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn test_export_to_file() {
        let store = sample_store();
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("events.jsonl");
        export_to_file(&store, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
