// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Commitment Engine.
//!
//! A commitment is `BLAKE3(content_id || secret)`: the 32 content bytes followed
//! by the 32 secret bytes, with no separator and no length prefix. The layout is
//! positional and only unambiguous because both inputs are fixed-width.
//!
//! This is a one-way binding, not a zero-knowledge proof. Proving ownership
//! means revealing the secret to the verifier, who can then reuse it. The ledger
//! relies on exactly this property and nothing stronger.

use crate::types::{Commitment, ContentId, Secret};

/// Binds `secret` to `content_id`. Pure and deterministic.
pub fn compute_commitment(content_id: &ContentId, secret: &Secret) -> Commitment {
    Commitment(*commitment_hash(content_id, secret).as_bytes())
}

/// Recomputes the commitment and compares it bitwise against `expected`.
pub fn verify_commitment(content_id: &ContentId, secret: &Secret, expected: &Commitment) -> bool {
    // blake3::Hash equality is constant-time.
    commitment_hash(content_id, secret) == blake3::Hash::from(expected.0)
}

fn commitment_hash(content_id: &ContentId, secret: &Secret) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(content_id.as_bytes());
    hasher.update(secret.as_bytes());
    hasher.finalize()
}
