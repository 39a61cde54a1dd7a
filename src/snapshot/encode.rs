// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::{SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use crate::snapshot::{checksum, HEADER_LEN, OWNER_LEN, RECORD_LEN, TRAILER_LEN};
use crate::state::ledger::LedgerState;

pub fn encode_state(state: &LedgerState) -> Vec<u8> {
    let records = state.sorted_records();
    let owners = state.sorted_owner_counts();

    let mut buf = Vec::with_capacity(
        HEADER_LEN + 8 + records.len() * RECORD_LEN + 8 + owners.len() * OWNER_LEN + TRAILER_LEN,
    );

    buf.extend_from_slice(&SNAPSHOT_MAGIC);
    buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    buf.extend_from_slice(&state.total_count().to_le_bytes());

    buf.extend_from_slice(&(records.len() as u64).to_le_bytes());
    for (content_id, record) in records {
        buf.extend_from_slice(content_id.as_bytes());
        buf.extend_from_slice(&record.verified_at.as_secs().to_le_bytes());
        buf.extend_from_slice(record.owner.as_bytes());
        buf.extend_from_slice(record.commitment.as_bytes());
    }

    buf.extend_from_slice(&(owners.len() as u64).to_le_bytes());
    for (identity, writes) in owners {
        buf.extend_from_slice(identity.as_bytes());
        buf.extend_from_slice(&writes.to_le_bytes());
    }

    let crc = checksum(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    buf
}
