// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! attest-kernel: commitment-based ownership proofs over a deterministic
//! attestation ledger.
//!
//! Two layers:
//! - [`commitment`]: `BLAKE3(content_id || secret)` and its verification.
//! - [`ledger`]: a last-writer-wins store of attestation records keyed by
//!   content id, with per-identity and global write counters.
//!
//! Everything below the ledger (events, snapshots, state hashing, replay) exists
//! so a node can persist the tables and a third party can audit them.

pub mod clock;
pub mod commitment;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod proof;
pub mod replay;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod types;
pub mod verify;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commitment::{compute_commitment, verify_commitment};
pub use error::{KernelError, KernelResult};
pub use ledger::{Ledger, Session};
pub use storage::record::AttestationRecord;
pub use storage::{AttestationStore, MemoryStore};
pub use types::{Commitment, ContentId, Identity, Secret, Timestamp};
