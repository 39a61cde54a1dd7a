// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Storage seam for the ledger.
//!
//! A store owns the ledger tables and applies `LedgerEvent`s to them. The
//! in-memory store is the reference implementation; durable backends wrap it
//! and must surface their own I/O faults as `KernelError::StorageUnavailable`.

pub mod memory;
pub mod record;

use crate::error::Result;
use crate::event::LedgerEvent;
use crate::types::{ContentId, Identity};
use record::AttestationRecord;

pub use memory::MemoryStore;

pub trait AttestationStore: Send + Sync {
    /// Applies one event. The record and both counters become visible together
    /// or not at all.
    fn commit(&self, event: &LedgerEvent) -> Result<()>;

    /// Calls `build` inside the write critical section and commits what it
    /// returns. Writes are serialised, so an event built later is applied
    /// later. Returns the committed event.
    fn commit_with(&self, build: &mut dyn FnMut() -> LedgerEvent) -> Result<LedgerEvent>;

    /// `Ok(None)` for identifiers that were never attested.
    fn attestation(&self, content_id: &ContentId) -> Result<Option<AttestationRecord>>;

    fn owner_count(&self, identity: &Identity) -> Result<u64>;

    fn total_count(&self) -> Result<u64>;
}

impl<S: AttestationStore + ?Sized> AttestationStore for std::sync::Arc<S> {
    fn commit(&self, event: &LedgerEvent) -> Result<()> {
        (**self).commit(event)
    }

    fn commit_with(&self, build: &mut dyn FnMut() -> LedgerEvent) -> Result<LedgerEvent> {
        (**self).commit_with(build)
    }

    fn attestation(&self, content_id: &ContentId) -> Result<Option<AttestationRecord>> {
        (**self).attestation(content_id)
    }

    fn owner_count(&self, identity: &Identity) -> Result<u64> {
        (**self).owner_count(identity)
    }

    fn total_count(&self) -> Result<u64> {
        (**self).total_count()
    }
}
