// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Width of a content identifier (a 32-byte content digest).
pub const CONTENT_ID_LEN: usize = 32;

/// Width of an owner secret.
pub const SECRET_LEN: usize = 32;

/// Width of a stored commitment (BLAKE3 output).
pub const COMMITMENT_LEN: usize = 32;

/// Width of a submitter identity (account address).
pub const IDENTITY_LEN: usize = 20;

/// Ledger protocol version, mixed into state hashes and proofs.
pub const KERNEL_VERSION: u64 = 1;

/// Snapshot magic: "ATST".
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"ATST";

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Event log format version.
pub const EVENT_LOG_VERSION: u32 = 1;
