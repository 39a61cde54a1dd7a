// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! In-memory store.

use parking_lot::RwLock;

use crate::error::Result;
use crate::event::LedgerEvent;
use crate::state::ledger::LedgerState;
use crate::storage::record::AttestationRecord;
use crate::storage::AttestationStore;
use crate::types::{ContentId, Identity};

/// All ledger tables behind one reader-writer lock.
///
/// A single lock keeps each record write and its two counter increments in one
/// critical section, so readers never see one without the others. Reads run in
/// parallel; writes are short and never wait on I/O.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<LedgerState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Runs `f` against a consistent view of the tables.
    pub fn with_state<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    /// Replaces every table at once, e.g. after loading a snapshot.
    pub fn replace_state(&self, state: LedgerState) {
        *self.state.write() = state;
    }

    pub fn state_hash(&self) -> [u8; 32] {
        self.with_state(crate::verify::ledger_state_hash)
    }
}

impl AttestationStore for MemoryStore {
    fn commit(&self, event: &LedgerEvent) -> Result<()> {
        self.state.write().apply_event(event).map(|_| ())
    }

    fn commit_with(&self, build: &mut dyn FnMut() -> LedgerEvent) -> Result<LedgerEvent> {
        let mut state = self.state.write();
        let event = build();
        state.apply_event(&event)?;
        Ok(event)
    }

    fn attestation(&self, content_id: &ContentId) -> Result<Option<AttestationRecord>> {
        Ok(self.state.read().get_record(content_id).copied())
    }

    fn owner_count(&self, identity: &Identity) -> Result<u64> {
        Ok(self.state.read().owner_count(identity))
    }

    fn total_count(&self) -> Result<u64> {
        Ok(self.state.read().total_count())
    }
}
