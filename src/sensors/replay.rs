// Replays a recorded walk: one JSON reading per line, each stamped with the
// milliseconds since the start of the trace.
//
//   {"at_ms": 0,    "kind": "position", "latitude": 45.1234, "longitude": -122.5678}
//   {"at_ms": 250,  "kind": "orientation", "alpha": 90, "beta": 10}
//   {"at_ms": 1000, "kind": "light", "lux": 3200}

use std::path::Path;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::Sender;
use serde::Deserialize;

use super::SensorReading;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReplayEntry {
    pub at_ms: u64,
    #[serde(flatten)]
    pub reading: SensorReading,
}

/// Blank lines and `#` comments are skipped, malformed lines are logged and dropped.
pub fn parse_trace(text: &str) -> Vec<ReplayEntry> {
    let mut entries: Vec<ReplayEntry> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .filter_map(|(n, line)| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("replay line {}: {e}", n + 1);
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| e.at_ms);
    entries
}

pub fn spawn_replay(path: &Path, tx: Sender<SensorReading>) -> anyhow::Result<JoinHandle<()>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading replay trace {}", path.display()))?;
    let entries = parse_trace(&text);
    log::info!("replaying {} readings from {}", entries.len(), path.display());

    let handle = std::thread::Builder::new()
        .name("sensor-replay".into())
        .spawn(move || {
            let start = Instant::now();
            for entry in entries {
                let due = start + Duration::from_millis(entry.at_ms);
                let now = Instant::now();
                if due > now {
                    std::thread::sleep(due - now);
                }
                if tx.send(stamped(entry)).is_err() {
                    break; // consumer gone
                }
            }
            log::info!("replay finished");
        })
        .context("spawning replay thread")?;
    Ok(handle)
}

// positions without their own clock take the trace time
fn stamped(entry: ReplayEntry) -> SensorReading {
    match entry.reading {
        SensorReading::Position(mut fix) => {
            if fix.timestamp_ms.is_none() {
                fix.timestamp_ms = Some(entry.at_ms as f64);
            }
            SensorReading::Position(fix)
        }
        other => other,
    }
}
