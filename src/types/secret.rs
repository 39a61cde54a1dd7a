// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Secret and commitment values.

use crate::config::{COMMITMENT_LEN, SECRET_LEN};

fixed_bytes!(
    /// Private value known only to the legitimate owner. Never stored.
    Secret,
    SECRET_LEN,
    "secret"
);

impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

fixed_bytes!(
    /// One-way binding of a content identifier and a secret. Safe to publish.
    Commitment,
    COMMITMENT_LEN,
    "commitment"
);
hex_display!(Commitment);
