// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Identity types.

use crate::config::{CONTENT_ID_LEN, IDENTITY_LEN};
use serde::{Deserialize, Serialize};

fixed_bytes!(
    /// Digest of a piece of content. The ledger's only key.
    ContentId,
    CONTENT_ID_LEN,
    "content identifier"
);
hex_display!(ContentId);

fixed_bytes!(
    /// Opaque submitter identity, established by whoever calls the ledger.
    Identity,
    IDENTITY_LEN,
    "identity"
);
hex_display!(Identity);

/// Seconds since the Unix epoch. Zero is reserved to mean "never attested".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Timestamp(secs)
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
