// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Canonical snapshot encoding.
//!
//! # Format
//! ```text
//! magic "ATST"            4 bytes
//! version                 u32 LE
//! total writes            u64 LE
//! record count            u64 LE
//!   content_id            32 bytes   (ascending)
//!   verified_at           u64 LE
//!   owner                 20 bytes
//!   commitment            32 bytes
//! owner count             u64 LE
//!   identity              20 bytes   (ascending)
//!   writes                u64 LE
//! crc64                   u64 LE     (over everything above)
//! ```
//!
//! Tables are written in sorted order so equal states encode to equal bytes.
pub mod decode;
pub mod encode;

pub(crate) const HEADER_LEN: usize = 4 + 4 + 8;
pub(crate) const RECORD_LEN: usize = 32 + 8 + 20 + 32;
pub(crate) const OWNER_LEN: usize = 20 + 8;
pub(crate) const TRAILER_LEN: usize = 8;

pub(crate) fn checksum(bytes: &[u8]) -> u64 {
    let mut digest = crc64fast::Digest::new();
    digest.write(bytes);
    digest.sum64()
}
