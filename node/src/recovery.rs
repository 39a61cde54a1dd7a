// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Crash Recovery
//!
//! The event log is the source of truth. A snapshot only shortens replay:
//! events up to its height are skipped, the rest are applied on top.

use attest_kernel::replay::apply_log_events;
use attest_kernel::snapshot::decode::decode_state;
use attest_kernel::state::ledger::LedgerState;
use attest_kernel::verify::{ledger_state_hash, snapshot_hash};

use crate::errors::EngineError;
use crate::events::event_log::{read_log, EventLogWriter};
use crate::persistence::SnapshotManager;

use std::path::Path;

/// Ledger state rebuilt at startup, plus what is needed to keep writing.
pub struct Recovered {
    pub state: LedgerState,
    pub writer: Option<EventLogWriter>,
    /// Kernel snapshot bytes the state started from, if any.
    pub base_snapshot: Option<Vec<u8>>,
    pub events_replayed: usize,
}

impl Recovered {
    pub fn base_snapshot_hash(&self) -> Option<[u8; 32]> {
        self.base_snapshot.as_deref().map(snapshot_hash)
    }
}

/// Loads and checks a snapshot file. Returns the kernel snapshot bytes and the
/// decoded state.
pub fn load_snapshot(path: &Path) -> Result<(Vec<u8>, LedgerState), EngineError> {
    let buffer = std::fs::read(path)?;
    let (meta, ledger_bytes) = SnapshotManager::parse(&buffer)
        .map_err(|e| EngineError::Snapshot(format!("{:?}: {}", path, e)))?;

    let state = decode_state(&ledger_bytes)?;

    if meta.event_height != state.total_count() {
        return Err(EngineError::Snapshot(format!(
            "{:?}: metadata height {} but ledger holds {} writes",
            path,
            meta.event_height,
            state.total_count()
        )));
    }
    if meta.state_hash != hex::encode(ledger_state_hash(&state)) {
        return Err(EngineError::Snapshot(format!("{:?}: state hash does not match metadata", path)));
    }

    Ok((ledger_bytes, state))
}

/// Rebuilds the ledger from an optional snapshot and an optional event log.
///
/// A missing snapshot file means "start empty"; a present but damaged one
/// fails recovery rather than silently dropping history.
pub fn recover(snapshot_path: Option<&Path>, event_log_path: Option<&Path>) -> Result<Recovered, EngineError> {
    let start = std::time::Instant::now();

    let (base_snapshot, mut state) = match snapshot_path {
        Some(path) if path.exists() => {
            tracing::info!("Loading snapshot: {:?}", path);
            let (bytes, state) = load_snapshot(path)?;
            tracing::info!("Snapshot restored at height {}", state.total_count());
            (Some(bytes), state)
        }
        Some(path) => {
            tracing::debug!("No snapshot at {:?}; starting empty", path);
            (None, LedgerState::new())
        }
        None => (None, LedgerState::new()),
    };

    let mut events_replayed = 0;
    let writer = match event_log_path {
        Some(path) => {
            tracing::info!("Replaying event log: {:?}", path);
            let loaded = read_log(path)?;
            if loaded.torn_tail {
                tracing::warn!("Event log {:?} ends in a torn frame; ignoring it", path);
            }
            events_replayed = apply_log_events(&mut state, &loaded.events)?;
            Some(EventLogWriter::open(path)?)
        }
        None => {
            tracing::warn!("No event log configured; writes will not survive a restart");
            None
        }
    };

    state.check_invariants()?;

    metrics::histogram!("attest_replay_duration_seconds", start.elapsed().as_secs_f64());
    tracing::info!(
        "Recovery complete: {} events replayed, {} writes total, state hash {}",
        events_replayed,
        state.total_count(),
        hex::encode(ledger_state_hash(&state))
    );

    Ok(Recovered {
        state,
        writer,
        base_snapshot,
        events_replayed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_kernel::event::LedgerEvent;
    use attest_kernel::snapshot::encode::encode_state;
    use attest_kernel::types::{Commitment, ContentId, Identity, Timestamp};
    use crate::persistence::SnapshotMeta;
    use tempfile::tempdir;

    fn event(n: u8) -> LedgerEvent {
        LedgerEvent::Attested {
            content_id: ContentId::repeat(n),
            commitment: Commitment::repeat(n),
            owner: Identity::repeat(1),
            verified_at: Timestamp(n as u64),
        }
    }

    #[test]
    fn test_nothing_configured_starts_empty() {
        let recovered = recover(None, None).unwrap();
        assert_eq!(recovered.state.total_count(), 0);
        assert!(recovered.writer.is_none());
        assert!(recovered.base_snapshot_hash().is_none());
    }

    #[test]
    fn test_snapshot_plus_log_tail() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("events.log");
        let snap_path = dir.path().join("ledger.snap");

        let mut writer = EventLogWriter::open(&log_path).unwrap();
        let mut state = LedgerState::new();
        for n in 1..=3 {
            writer.append(&event(n)).unwrap();
            state.apply_event(&event(n)).unwrap();
        }
        let mut meta = SnapshotMeta::new(0, 3, ledger_state_hash(&state));
        SnapshotManager::save(&snap_path, &encode_state(&state), &mut meta).unwrap();
        for n in 4..=5 {
            writer.append(&event(n)).unwrap();
            state.apply_event(&event(n)).unwrap();
        }
        drop(writer);

        let recovered = recover(Some(snap_path.as_path()), Some(log_path.as_path())).unwrap();
        assert_eq!(recovered.events_replayed, 2);
        assert_eq!(recovered.state, state);
        assert!(recovered.base_snapshot_hash().is_some());
    }

    #[test]
    fn test_snapshot_with_wrong_metadata_hash_is_rejected() {
        let dir = tempdir().unwrap();
        let snap_path = dir.path().join("ledger.snap");

        let mut state = LedgerState::new();
        state.apply_event(&event(1)).unwrap();
        let mut meta = SnapshotMeta::new(0, 1, [0u8; 32]);
        SnapshotManager::save(&snap_path, &encode_state(&state), &mut meta).unwrap();

        assert!(matches!(recover(Some(snap_path.as_path()), None), Err(EngineError::Snapshot(_))));
    }
}
