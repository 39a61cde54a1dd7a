// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::config::{SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
use crate::error::{KernelError, Result};
use crate::snapshot::{checksum, HEADER_LEN, OWNER_LEN, RECORD_LEN, TRAILER_LEN};
use crate::state::ledger::LedgerState;
use crate::storage::record::AttestationRecord;
use crate::types::{Commitment, ContentId, Identity, Timestamp};

const TRUNCATED: KernelError = KernelError::CorruptSnapshot("truncated");

pub fn decode_state(bytes: &[u8]) -> Result<LedgerState> {
    if bytes.len() < HEADER_LEN + 16 + TRAILER_LEN {
        return Err(TRUNCATED);
    }

    let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
    let stored_crc = Cursor::new(trailer).read_u64::<LittleEndian>().map_err(|_| TRUNCATED)?;
    if checksum(body) != stored_crc {
        return Err(KernelError::CorruptSnapshot("checksum mismatch"));
    }

    let mut cursor = Cursor::new(body);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(|_| TRUNCATED)?;
    if magic != SNAPSHOT_MAGIC {
        return Err(KernelError::CorruptSnapshot("invalid magic"));
    }

    let version = cursor.read_u32::<LittleEndian>().map_err(|_| TRUNCATED)?;
    if version != SNAPSHOT_VERSION {
        return Err(KernelError::CorruptSnapshot("unsupported version"));
    }

    let mut state = LedgerState::new();
    state.total = cursor.read_u64::<LittleEndian>().map_err(|_| TRUNCATED)?;

    let record_count = read_len(&mut cursor, RECORD_LEN)?;
    let mut last_id: Option<ContentId> = None;
    for _ in 0..record_count {
        let content_id = ContentId(read_array(&mut cursor)?);
        let verified_at = Timestamp(cursor.read_u64::<LittleEndian>().map_err(|_| TRUNCATED)?);
        let owner = Identity(read_array(&mut cursor)?);
        let commitment = Commitment(read_array(&mut cursor)?);

        if last_id.is_some_and(|prev| prev >= content_id) {
            return Err(KernelError::CorruptSnapshot("records out of order"));
        }
        last_id = Some(content_id);

        state
            .records
            .insert(content_id, AttestationRecord::new(verified_at, owner, commitment));
    }

    let owner_count = read_len(&mut cursor, OWNER_LEN)?;
    let mut last_owner: Option<Identity> = None;
    for _ in 0..owner_count {
        let identity = Identity(read_array(&mut cursor)?);
        let writes = cursor.read_u64::<LittleEndian>().map_err(|_| TRUNCATED)?;

        if last_owner.is_some_and(|prev| prev >= identity) {
            return Err(KernelError::CorruptSnapshot("owner counters out of order"));
        }
        last_owner = Some(identity);

        state.owner_counts.insert(identity, writes);
    }

    if cursor.position() as usize != body.len() {
        return Err(KernelError::CorruptSnapshot("trailing bytes"));
    }

    state
        .check_invariants()
        .map_err(|_| KernelError::CorruptSnapshot("inconsistent tables"))?;

    Ok(state)
}

/// Reads a table length and checks it against the bytes actually left.
fn read_len(cursor: &mut Cursor<&[u8]>, entry_len: usize) -> Result<usize> {
    let count = cursor.read_u64::<LittleEndian>().map_err(|_| TRUNCATED)?;
    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    match count.checked_mul(entry_len as u64) {
        Some(needed) if needed <= remaining => Ok(count as usize),
        _ => Err(TRUNCATED),
    }
}

fn read_array<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    cursor.read_exact(&mut out).map_err(|_| TRUNCATED)?;
    Ok(out)
}
