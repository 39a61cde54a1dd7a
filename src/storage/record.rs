// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record definition.

use crate::types::{Commitment, Identity, Timestamp};
use serde::{Deserialize, Serialize};

/// The most recent attestation for one content identifier.
///
/// `AttestationRecord::default()` is the absent form: zero timestamp, zero
/// owner, zero commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub verified_at: Timestamp,
    pub owner: Identity,
    pub commitment: Commitment,
}

impl AttestationRecord {
    pub fn new(verified_at: Timestamp, owner: Identity, commitment: Commitment) -> Self {
        Self {
            verified_at,
            owner,
            commitment,
        }
    }

    pub fn is_attested(&self) -> bool {
        !self.verified_at.is_zero()
    }
}
