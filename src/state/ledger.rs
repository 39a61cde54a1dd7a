// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger State definition.

use rustc_hash::FxHashMap;

use crate::error::{KernelError, Result};
use crate::event::LedgerEvent;
use crate::storage::record::AttestationRecord;
use crate::types::{ContentId, Identity};

/// The three ledger tables: records by content, write counts by identity, and
/// the global write count.
///
/// Each applied event increments `total` by exactly one, so `total` doubles as
/// the event height: the number of log entries this state has absorbed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub(crate) records: FxHashMap<ContentId, AttestationRecord>,
    pub(crate) owner_counts: FxHashMap<Identity, u64>,
    pub(crate) total: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Read APIs ---

    pub fn get_record(&self, content_id: &ContentId) -> Option<&AttestationRecord> {
        self.records.get(content_id)
    }

    pub fn owner_count(&self, identity: &Identity) -> u64 {
        self.owner_counts.get(identity).copied().unwrap_or(0)
    }

    pub fn total_count(&self) -> u64 {
        self.total
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Records in canonical (ascending content id) order.
    pub fn sorted_records(&self) -> Vec<(&ContentId, &AttestationRecord)> {
        let mut entries: Vec<_> = self.records.iter().collect();
        entries.sort_unstable_by_key(|(id, _)| **id);
        entries
    }

    /// Owner counters in canonical (ascending identity) order.
    pub fn sorted_owner_counts(&self) -> Vec<(&Identity, u64)> {
        let mut entries: Vec<_> = self.owner_counts.iter().map(|(id, n)| (id, *n)).collect();
        entries.sort_unstable_by_key(|(id, _)| **id);
        entries
    }

    // --- Write Logic ---

    /// Applies an event and returns the record it replaced, if any.
    pub fn apply_event(&mut self, event: &LedgerEvent) -> Result<Option<AttestationRecord>> {
        event.validate()?;

        match event {
            LedgerEvent::Attested {
                content_id,
                commitment,
                owner,
                verified_at,
            } => {
                let previous = self
                    .records
                    .insert(*content_id, AttestationRecord::new(*verified_at, *owner, *commitment));
                *self.owner_counts.entry(*owner).or_insert(0) += 1;
                self.total += 1;
                Ok(previous)
            }
        }
    }

    // --- Invariant Checker ---

    /// Checks the internal consistency of the ledger tables.
    pub fn check_invariants(&self) -> Result<()> {
        let owner_sum: u64 = self.owner_counts.values().sum();
        if owner_sum != self.total {
            return Err(KernelError::InvariantViolation("owner counters do not sum to the global counter"));
        }

        if self.records.len() as u64 > self.total {
            return Err(KernelError::InvariantViolation("more records than writes"));
        }

        for record in self.records.values() {
            if !record.is_attested() {
                return Err(KernelError::InvariantViolation("stored record has a zero timestamp"));
            }
            if self.owner_count(&record.owner) == 0 {
                return Err(KernelError::InvariantViolation("record owner has no recorded writes"));
            }
        }

        if self.owner_counts.values().any(|n| *n == 0) {
            return Err(KernelError::InvariantViolation("zero-valued owner counter"));
        }

        Ok(())
    }
}
