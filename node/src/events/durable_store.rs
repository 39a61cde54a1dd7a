// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Write-ahead attestation store.
//!
//! Commit protocol:
//! 1. validate the event
//! 2. append to the event log (fsync)
//! 3. apply to the in-memory tables
//!
//! Steps 2 and 3 run under one writer lock, so log order equals apply order.
//! A failure in step 2 leaves memory untouched and is reported as
//! `StorageUnavailable`. Reads never take the writer lock.

use attest_kernel::error::{KernelError, Result};
use attest_kernel::event::LedgerEvent;
use attest_kernel::snapshot::encode::encode_state;
use attest_kernel::state::ledger::LedgerState;
use attest_kernel::storage::record::AttestationRecord;
use attest_kernel::storage::{AttestationStore, MemoryStore};
use attest_kernel::types::{ContentId, Identity};
use attest_kernel::verify::{event_log_hash, ledger_state_hash};
use parking_lot::Mutex;

use crate::events::event_log::EventLogWriter;

pub struct DurableStore {
    writer: Mutex<Option<EventLogWriter>>,
    memory: MemoryStore,
}

/// Ledger tables captured together with the log that produced them.
#[derive(Debug, Clone)]
pub struct LedgerCapture {
    pub snapshot: Vec<u8>,
    pub state_hash: [u8; 32],
    pub event_log_hash: [u8; 32],
    pub event_count: u64,
}

impl DurableStore {
    /// Store with no event log. Writes live only as long as the process.
    pub fn in_memory(state: LedgerState) -> Self {
        Self {
            writer: Mutex::new(None),
            memory: MemoryStore::from_state(state),
        }
    }

    /// Store backed by `writer`. `state` must already reflect every event in it.
    pub fn with_log(state: LedgerState, writer: EventLogWriter) -> Self {
        Self {
            writer: Mutex::new(Some(writer)),
            memory: MemoryStore::from_state(state),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.writer.lock().is_some()
    }

    /// Snapshot bytes, state hash and log hash taken at one instant: no write
    /// can land between reading the tables and hashing the log.
    pub fn capture(&self) -> Result<LedgerCapture> {
        let writer = self.writer.lock();

        let (snapshot, state_hash, event_count) = self
            .memory
            .with_state(|state| (encode_state(state), ledger_state_hash(state), state.total_count()));

        let log_hash = match writer.as_ref() {
            Some(w) => event_log_hash(&std::fs::read(w.path()).map_err(KernelError::storage)?),
            None => event_log_hash(&[]),
        };

        Ok(LedgerCapture {
            snapshot,
            state_hash,
            event_log_hash: log_hash,
            event_count,
        })
    }

    // Caller holds the writer lock.
    fn append_and_apply(&self, log: Option<&mut EventLogWriter>, event: &LedgerEvent) -> Result<()> {
        event.validate()?;
        if let Some(log) = log {
            log.append(event).map_err(|e| {
                tracing::error!("Event log append failed for {}: {}", event.content_id(), e);
                KernelError::storage(e)
            })?;
        }
        self.memory.commit(event)
    }
}

impl AttestationStore for DurableStore {
    fn commit(&self, event: &LedgerEvent) -> Result<()> {
        let mut writer = self.writer.lock();
        self.append_and_apply(writer.as_mut(), event)
    }

    fn commit_with(&self, build: &mut dyn FnMut() -> LedgerEvent) -> Result<LedgerEvent> {
        let mut writer = self.writer.lock();
        let event = build();
        self.append_and_apply(writer.as_mut(), &event)?;
        Ok(event)
    }

    fn attestation(&self, content_id: &ContentId) -> Result<Option<AttestationRecord>> {
        self.memory.attestation(content_id)
    }

    fn owner_count(&self, identity: &Identity) -> Result<u64> {
        self.memory.owner_count(identity)
    }

    fn total_count(&self) -> Result<u64> {
        self.memory.total_count()
    }
}
