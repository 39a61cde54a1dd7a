//! Deterministic Hashing and Verification.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::KERNEL_VERSION;
use crate::state::ledger::LedgerState;

/// Computes the BLAKE3 hash of the ledger tables.
///
/// Covers, in order: kernel version, global counter, every record sorted by
/// content id, every owner counter sorted by identity. Table sizes are hashed
/// before their entries so the two tables cannot bleed into each other.
///
/// Two ledgers that absorbed the same writes hash identically regardless of
/// hash-map iteration order or platform.
pub fn ledger_state_hash(state: &LedgerState) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();

    hasher.update(&KERNEL_VERSION.to_le_bytes());
    hasher.update(&state.total_count().to_le_bytes());

    let records = state.sorted_records();
    hasher.update(&(records.len() as u64).to_le_bytes());
    for (content_id, record) in records {
        hasher.update(content_id.as_bytes());
        hasher.update(&record.verified_at.as_secs().to_le_bytes());
        hasher.update(record.owner.as_bytes());
        hasher.update(record.commitment.as_bytes());
    }

    let owners = state.sorted_owner_counts();
    hasher.update(&(owners.len() as u64).to_le_bytes());
    for (identity, writes) in owners {
        hasher.update(identity.as_bytes());
        hasher.update(&writes.to_le_bytes());
    }

    *hasher.finalize().as_bytes()
}

pub fn snapshot_hash(snapshot_bytes: &[u8]) -> [u8; 32] {
    blake3::hash(snapshot_bytes).into()
}

pub fn event_log_hash(event_log_bytes: &[u8]) -> [u8; 32] {
    blake3::hash(event_log_bytes).into()
}
