//! Deterministic Proof Structures.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

/// A receipt binding a ledger's history to its current state.
///
/// Anyone holding the snapshot and event log named here can rerun
/// [`crate::replay::replay_and_hash`] and check `final_state_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerProof {
    /// The version of the ledger protocol.
    pub kernel_version: u64,

    /// BLAKE3 hash of the base snapshot, if the node started from one.
    pub snapshot_hash: Option<[u8; 32]>,

    /// BLAKE3 hash of the event log file.
    pub event_log_hash: [u8; 32],

    /// BLAKE3 hash of the ledger tables after every logged event.
    pub final_state_hash: [u8; 32],

    /// Number of writes the ledger has absorbed.
    pub event_count: u64,
}
