// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event-Sourced Persistence Layer
//!
//! - Event log = primary truth (append-only, fsync'd before memory is touched)
//! - Snapshots = startup optimization, always reconcilable with the log
//! - `DurableStore` = the kernel's `AttestationStore` backed by both

pub mod durable_store;
pub mod event_log;

pub use durable_store::{DurableStore, LedgerCapture};
pub use event_log::{EventLogError, EventLogWriter};
