// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Snapshot files on disk.
//!
//! Layout: `[MAGIC u32][VER u32][META_LEN u32][META_JSON][LEDGER][CRC32 u32]`.
//! `LEDGER` is the kernel's own snapshot encoding; the outer frame only adds
//! metadata and a whole-file checksum.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAGIC: u32 = 0x4154_5346; // ATSF
const SCHEMA_VERSION: u32 = 1;
const PREFIX_LEN: usize = 12;
const CRC_LEN: usize = 4;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub version: u32,
    /// Seconds since the epoch when the file was written.
    pub timestamp: u64,
    pub ledger_len: u64,
    /// Number of log events folded into this snapshot.
    pub event_height: u64,
    /// Hex BLAKE3 hash of the ledger tables.
    pub state_hash: String,
}

impl SnapshotMeta {
    pub fn new(timestamp: u64, event_height: u64, state_hash: [u8; 32]) -> Self {
        Self {
            version: SCHEMA_VERSION,
            timestamp,
            ledger_len: 0,
            event_height,
            state_hash: hex::encode(state_hash),
        }
    }
}

#[derive(Error, Debug)]
pub enum SnapshotFileError {
    #[error("Snapshot too short")]
    TooShort,
    #[error("Checksum mismatch")]
    Checksum,
    #[error("Invalid MAGIC")]
    Magic,
    #[error("Version mismatch: {0}")]
    Version(u32),
    #[error("Truncated metadata")]
    TruncatedMeta,
    #[error("Bad metadata: {0}")]
    Meta(#[from] serde_json::Error),
    #[error("Snapshot corrupted: meta claims {claimed} bytes, found {found}")]
    Length { claimed: u64, found: u64 },
}

pub struct SnapshotManager;

impl SnapshotManager {
    /// Writes atomically: `<name>.tmp`, fsync, keep one `<name>.prev`, rename
    /// into place.
    pub fn save(path: &Path, ledger_data: &[u8], meta: &mut SnapshotMeta) -> Result<(), std::io::Error> {
        let tmp_path = Self::sibling(path, "tmp")?;
        let prev_path = Self::sibling(path, "prev")?;
        meta.ledger_len = ledger_data.len() as u64;

        {
            let mut file = File::create(&tmp_path)?;
            let mut hasher = Hasher::new();

            let meta_json = serde_json::to_vec(meta)?;
            let meta_len = meta_json.len() as u32;

            let mut write_chunk = |data: &[u8]| -> std::io::Result<()> {
                file.write_all(data)?;
                hasher.update(data);
                Ok(())
            };

            write_chunk(&MAGIC.to_le_bytes())?;
            write_chunk(&SCHEMA_VERSION.to_le_bytes())?;
            write_chunk(&meta_len.to_le_bytes())?;
            write_chunk(&meta_json)?;
            write_chunk(ledger_data)?;

            let checksum = hasher.finalize();
            file.write_all(&checksum.to_le_bytes())?;
            file.sync_all()?;
        }

        if path.exists() {
            if let Err(e) = std::fs::rename(path, &prev_path) {
                tracing::warn!("Could not rotate previous snapshot to {:?}: {}", prev_path, e);
            }
        }

        std::fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// `path` with `.suffix` appended to its full file name.
    pub fn sibling(path: &Path, suffix: &str) -> Result<PathBuf, std::io::Error> {
        let mut name = path
            .file_name()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("snapshot path {:?} has no file name", path),
                )
            })?
            .to_os_string();
        name.push(".");
        name.push(suffix);
        Ok(path.with_file_name(name))
    }

    pub fn parse(buffer: &[u8]) -> Result<(SnapshotMeta, Vec<u8>), SnapshotFileError> {
        if buffer.len() < PREFIX_LEN + CRC_LEN {
            return Err(SnapshotFileError::TooShort);
        }

        let (content, trailer) = buffer.split_at(buffer.len() - CRC_LEN);
        let stored_crc = read_u32(trailer, 0);

        let mut hasher = Hasher::new();
        hasher.update(content);
        if hasher.finalize() != stored_crc {
            return Err(SnapshotFileError::Checksum);
        }

        if read_u32(content, 0) != MAGIC {
            return Err(SnapshotFileError::Magic);
        }
        let version = read_u32(content, 4);
        if version != SCHEMA_VERSION {
            return Err(SnapshotFileError::Version(version));
        }

        let meta_len = read_u32(content, 8) as usize;
        let meta_end = PREFIX_LEN + meta_len;
        if content.len() < meta_end {
            return Err(SnapshotFileError::TruncatedMeta);
        }

        let meta: SnapshotMeta = serde_json::from_slice(&content[PREFIX_LEN..meta_end])?;

        let found = (content.len() - meta_end) as u64;
        if found != meta.ledger_len {
            return Err(SnapshotFileError::Length { claimed: meta.ledger_len, found });
        }

        Ok((meta, content[meta_end..].to_vec()))
    }
}

// Callers check bounds first.
fn read_u32(buf: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.snap");
        let mut meta = SnapshotMeta::new(42, 7, [9u8; 32]);

        SnapshotManager::save(&path, b"ledger-bytes", &mut meta).unwrap();
        let (parsed, ledger) = SnapshotManager::parse(&std::fs::read(&path).unwrap()).unwrap();

        assert_eq!(parsed, meta);
        assert_eq!(parsed.ledger_len, 12);
        assert_eq!(ledger, b"ledger-bytes");
    }

    #[test]
    fn test_second_save_rotates_previous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.snap");

        SnapshotManager::save(&path, b"one", &mut SnapshotMeta::new(1, 1, [0u8; 32])).unwrap();
        SnapshotManager::save(&path, b"two", &mut SnapshotMeta::new(2, 2, [0u8; 32])).unwrap();

        let (_, prev) = SnapshotManager::parse(&std::fs::read(SnapshotManager::sibling(&path, "prev").unwrap()).unwrap()).unwrap();
        let (_, cur) = SnapshotManager::parse(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(prev, b"one");
        assert_eq!(cur, b"two");
        assert!(!dir.path().join("ledger.snap.tmp").exists());
        assert!(dir.path().join("ledger.snap.prev").exists());
    }

    #[test]
    fn test_flipped_byte_fails_checksum() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.snap");
        SnapshotManager::save(&path, b"payload", &mut SnapshotMeta::new(1, 1, [0u8; 32])).unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x01;
        assert!(matches!(SnapshotManager::parse(&bytes), Err(SnapshotFileError::Checksum)));
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(matches!(SnapshotManager::parse(&[0u8; 8]), Err(SnapshotFileError::TooShort)));
    }

    #[test]
    fn test_snapshot_named_like_temp_file_saves_twice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.tmp");

        SnapshotManager::save(&path, b"one", &mut SnapshotMeta::new(1, 1, [0u8; 32])).unwrap();
        SnapshotManager::save(&path, b"two", &mut SnapshotMeta::new(2, 2, [0u8; 32])).unwrap();

        let (_, cur) = SnapshotManager::parse(&std::fs::read(&path).unwrap()).unwrap();
        let (_, prev) = SnapshotManager::parse(&std::fs::read(dir.path().join("ledger.tmp.prev")).unwrap()).unwrap();
        assert_eq!(cur, b"two");
        assert_eq!(prev, b"one");
    }

    #[test]
    fn test_path_without_file_name_is_rejected() {
        let err = SnapshotManager::save(Path::new("/"), b"x", &mut SnapshotMeta::new(1, 1, [0u8; 32])).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
