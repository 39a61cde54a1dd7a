// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-width value types shared by the commitment engine and the ledger.
//!
//! Every type here is a plain byte array with a known width. Construction from
//! untrusted input (`from_slice`, `from_hex`) is width-checked so malformed
//! values are rejected before they can reach storage.

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Every byte set to `byte`. Handy for fixtures like `0x11..11`.
            pub const fn repeat(byte: u8) -> Self {
                Self([byte; $len])
            }

            pub fn from_slice(bytes: &[u8]) -> $crate::error::Result<Self> {
                let arr: [u8; $len] = bytes
                    .try_into()
                    .map_err(|_| $crate::error::KernelError::wrong_width($field, $len, bytes.len()))?;
                Ok(Self(arr))
            }

            /// Parses lowercase or uppercase hex, with or without a `0x` prefix.
            pub fn from_hex(s: &str) -> $crate::error::Result<Self> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(digits).map_err(|e| $crate::error::KernelError::MalformedInput {
                    field: $field,
                    reason: e.to_string(),
                })?;
                Self::from_slice(&bytes)
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

macro_rules! hex_display {
    ($name:ident) => {
        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "0x{}", self.to_hex())
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

pub mod id;
pub mod secret;

pub use id::{ContentId, Identity, Timestamp};
pub use secret::{Commitment, Secret};
