// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger events.
//!
//! Every state transition is expressed as a `LedgerEvent`. Applying the same
//! sequence of events to an empty ledger always produces the same state, which
//! is what makes the event log replayable and the state hash auditable.
//!
//! Events carry the timestamp and owner already resolved by the ledger, so
//! replay never consults a clock or a caller.

use crate::types::{Commitment, ContentId, Identity, Timestamp};
use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LedgerEvent {
    /// Upsert of the record at `content_id`. Overwrites unconditionally.
    Attested {
        content_id: ContentId,
        commitment: Commitment,
        owner: Identity,
        verified_at: Timestamp,
    },
}

impl LedgerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::Attested { .. } => "Attested",
        }
    }

    /// Rejects events that could never have come from a valid write.
    pub fn validate(&self) -> Result<()> {
        match self {
            LedgerEvent::Attested { verified_at, .. } if verified_at.is_zero() => Err(KernelError::MalformedInput {
                field: "timestamp",
                reason: "zero is reserved for unattested records".into(),
            }),
            LedgerEvent::Attested { .. } => Ok(()),
        }
    }

    pub fn content_id(&self) -> &ContentId {
        match self {
            LedgerEvent::Attested { content_id, .. } => content_id,
        }
    }

    pub fn verified_at(&self) -> Timestamp {
        match self {
            LedgerEvent::Attested { verified_at, .. } => *verified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LedgerEvent {
        LedgerEvent::Attested {
            content_id: ContentId::repeat(0xab),
            commitment: Commitment::repeat(0xcd),
            owner: Identity::repeat(0x01),
            verified_at: Timestamp(1_700_000_000),
        }
    }

    #[test]
    fn test_event_serialization_determinism() {
        let event = sample();

        let bytes1 = bincode::serde::encode_to_vec(event, bincode::config::standard()).unwrap();
        let bytes2 = bincode::serde::encode_to_vec(event, bincode::config::standard()).unwrap();

        assert_eq!(bytes1, bytes2, "Event serialization must be deterministic");
    }

    #[test]
    fn test_event_decodes_back() {
        let original = sample();

        let bytes = bincode::serde::encode_to_vec(original, bincode::config::standard()).unwrap();
        let (decoded, read): (LedgerEvent, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();

        assert_eq!(read, bytes.len());
        assert_eq!(original, decoded);
        assert_eq!(decoded.event_type(), "Attested");
    }
}
