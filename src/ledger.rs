// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Attestation Ledger.
//!
//! The ledger is permissionless: any identity may attest any content id, and a
//! later write replaces the earlier record wholesale (last writer wins). There
//! is no history and no revocation. Access control, if wanted, lives in front
//! of this type.

use crate::clock::{Clock, SystemClock};
use crate::commitment::verify_commitment;
use crate::error::Result;
use crate::event::LedgerEvent;
use crate::storage::record::AttestationRecord;
use crate::storage::{AttestationStore, MemoryStore};
use crate::types::{Commitment, ContentId, Identity, Secret, Timestamp};

pub struct Ledger<S = MemoryStore, C = SystemClock> {
    store: S,
    clock: C,
}

impl Ledger<MemoryStore, SystemClock> {
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), SystemClock::new())
    }
}

impl<S: AttestationStore, C: Clock> Ledger<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Binds an authenticated identity to this ledger. Writes made through the
    /// returned session are stamped with that identity and the ledger's clock.
    pub fn session(&self, identity: Identity) -> Session<'_, S, C> {
        Session { ledger: self, identity }
    }

    // --- Write API ---

    /// Upserts `{now, submitter, commitment}` at `content_id` and bumps the
    /// submitter's and the global write counters. Returns `now`.
    pub fn record(
        &self,
        content_id: ContentId,
        commitment: Commitment,
        submitter: Identity,
        now: Timestamp,
    ) -> Result<Timestamp> {
        let event = LedgerEvent::Attested {
            content_id,
            commitment,
            owner: submitter,
            verified_at: now,
        };
        event.validate()?;
        self.store.commit(&event)?;

        tracing::debug!(
            content_id = %content_id,
            owner = %submitter,
            verified_at = now.as_secs(),
            "attestation recorded"
        );
        Ok(now)
    }

    // --- Read APIs ---

    pub fn get_attestation(&self, content_id: &ContentId) -> Result<Option<AttestationRecord>> {
        self.store.attestation(content_id)
    }

    pub fn is_verified(&self, content_id: &ContentId) -> Result<bool> {
        Ok(self
            .store
            .attestation(content_id)?
            .is_some_and(|record| record.is_attested()))
    }

    /// True iff `secret` reproduces the commitment stored for `content_id`.
    /// Unattested identifiers never verify.
    pub fn verify_ownership_proof(&self, content_id: &ContentId, secret: &Secret) -> Result<bool> {
        let verified = match self.store.attestation(content_id)? {
            Some(record) => verify_commitment(content_id, secret, &record.commitment),
            None => false,
        };
        tracing::debug!(content_id = %content_id, verified, "ownership proof checked");
        Ok(verified)
    }

    pub fn get_owner(&self, content_id: &ContentId) -> Result<Option<Identity>> {
        Ok(self.store.attestation(content_id)?.map(|record| record.owner))
    }

    pub fn get_owner_attestation_count(&self, identity: &Identity) -> Result<u64> {
        self.store.owner_count(identity)
    }

    pub fn get_total_attestation_count(&self) -> Result<u64> {
        self.store.total_count()
    }
}

/// A ledger handle acting on behalf of one identity.
pub struct Session<'a, S, C> {
    ledger: &'a Ledger<S, C>,
    identity: Identity,
}

impl<'a, S: AttestationStore, C: Clock> Session<'a, S, C> {
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Records `commitment` for `content_id` at the ledger clock's current time.
    ///
    /// The clock is read inside the store's write critical section, so
    /// timestamps follow apply order and `verified_at` never goes backwards.
    pub fn attest(&self, content_id: ContentId, commitment: Commitment) -> Result<Timestamp> {
        let clock = &self.ledger.clock;
        let owner = self.identity;
        let event = self.ledger.store.commit_with(&mut || LedgerEvent::Attested {
            content_id,
            commitment,
            owner,
            verified_at: clock.now(),
        })?;

        let verified_at = event.verified_at();
        tracing::debug!(
            content_id = %content_id,
            owner = %owner,
            verified_at = verified_at.as_secs(),
            "attestation recorded"
        );
        Ok(verified_at)
    }
}
