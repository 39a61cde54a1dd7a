//! Event log framing and deterministic replay.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

use crate::config::{CONTENT_ID_LEN, EVENT_LOG_VERSION};
use crate::error::{KernelError, Result};
use crate::event::LedgerEvent;
use crate::snapshot::decode::decode_state;
use crate::state::ledger::LedgerState;
use crate::verify::ledger_state_hash;

/// Event log header (16 bytes).
/// [Version: u32][KeyWidth: u32][Reserved: u64]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLogHeader {
    pub version: u32,
    pub key_width: u32,
    pub reserved: u64,
}

impl Default for EventLogHeader {
    fn default() -> Self {
        Self {
            version: EVENT_LOG_VERSION,
            key_width: CONTENT_ID_LEN as u32,
            reserved: 0,
        }
    }
}

impl EventLogHeader {
    pub const SIZE: usize = 16;

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&self.version.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.key_width.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }

    /// Parses and validates the header, returning the bytes after it.
    pub fn read(buf: &[u8]) -> Result<(Self, &[u8])> {
        if buf.len() < Self::SIZE {
            return Err(KernelError::CorruptEventLog("header truncated".into()));
        }

        let mut version = [0u8; 4];
        let mut key_width = [0u8; 4];
        let mut reserved = [0u8; 8];
        version.copy_from_slice(&buf[0..4]);
        key_width.copy_from_slice(&buf[4..8]);
        reserved.copy_from_slice(&buf[8..16]);

        let header = Self {
            version: u32::from_le_bytes(version),
            key_width: u32::from_le_bytes(key_width),
            reserved: u64::from_le_bytes(reserved),
        };

        if header.version != EVENT_LOG_VERSION {
            return Err(KernelError::CorruptEventLog(format!(
                "unsupported version {}",
                header.version
            )));
        }
        if header.key_width != CONTENT_ID_LEN as u32 {
            return Err(KernelError::CorruptEventLog(format!(
                "key width {} does not match {}",
                header.key_width, CONTENT_ID_LEN
            )));
        }

        Ok((header, &buf[Self::SIZE..]))
    }
}

/// Encodes one event as `[len: u32 LE][bincode bytes]`.
pub fn encode_frame(event: &LedgerEvent) -> Result<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(event, bincode::config::standard())
        .map_err(|e| KernelError::CorruptEventLog(e.to_string()))?;

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Events decoded from an event log body.
#[derive(Debug, Default)]
pub struct DecodedFrames {
    pub events: Vec<LedgerEvent>,
    /// Bytes covered by complete frames.
    pub consumed: usize,
    /// A partial frame was found at the end (interrupted append).
    pub torn_tail: bool,
}

/// Decodes every complete frame in `body` (the bytes after the header).
///
/// A short final frame is reported via `torn_tail` rather than as an error: it
/// is what an append interrupted by a crash leaves behind. A complete frame
/// that fails to decode is corruption.
pub fn decode_frames(body: &[u8]) -> Result<DecodedFrames> {
    let mut out = DecodedFrames::default();
    let mut offset = 0;

    while offset < body.len() {
        let rest = &body[offset..];
        if rest.len() < 4 {
            out.torn_tail = true;
            break;
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&rest[..4]);
        let len = u32::from_le_bytes(len_bytes) as usize;

        if rest.len() < 4 + len {
            out.torn_tail = true;
            break;
        }

        let payload = &rest[4..4 + len];
        let (event, read): (LedgerEvent, usize) =
            bincode::serde::decode_from_slice(payload, bincode::config::standard()).map_err(|e| {
                KernelError::CorruptEventLog(format!("frame at offset {}: {}", offset, e))
            })?;
        if read != len {
            return Err(KernelError::CorruptEventLog(format!(
                "frame at offset {} has {} trailing bytes",
                offset,
                len - read
            )));
        }

        out.events.push(event);
        offset += 4 + len;
    }

    out.consumed = offset;
    Ok(out)
}

/// Applies the events of a log to `state`, skipping the ones it already holds.
///
/// A state with `total_count() == n` has absorbed the first `n` events of the
/// log it was built from. Returns the number of events newly applied.
pub fn apply_log_events(state: &mut LedgerState, events: &[LedgerEvent]) -> Result<usize> {
    let height = state.total_count() as usize;
    if height > events.len() {
        return Err(KernelError::CorruptEventLog(format!(
            "snapshot height {} is ahead of the event log ({} events)",
            height,
            events.len()
        )));
    }

    for event in &events[height..] {
        state.apply_event(event)?;
    }
    Ok(events.len() - height)
}

/// Rebuilds ledger state from a snapshot plus an event log and returns the
/// final state hash.
///
/// `snapshot_bytes` may be empty (start from an empty ledger). `event_log_bytes`
/// may be empty (snapshot only); otherwise it must start with a valid header.
pub fn replay_and_hash(snapshot_bytes: &[u8], event_log_bytes: &[u8]) -> Result<[u8; 32]> {
    let mut state = if snapshot_bytes.is_empty() {
        LedgerState::new()
    } else {
        decode_state(snapshot_bytes)?
    };

    if !event_log_bytes.is_empty() {
        let (_, body) = EventLogHeader::read(event_log_bytes)?;
        let frames = decode_frames(body)?;
        apply_log_events(&mut state, &frames.events)?;
    }

    state.check_invariants()?;
    Ok(ledger_state_hash(&state))
}
