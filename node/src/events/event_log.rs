// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-Only Event Log Writer
//!
//! # File Format
//! ```text
//! [Header: 16 bytes][len: u32][Event][len: u32][Event]...
//! ```
//!
//! The header and frame layout are defined by `attest_kernel::replay` so the
//! kernel can replay a node's log without the node.

use attest_kernel::error::KernelError;
use attest_kernel::event::LedgerEvent;
use attest_kernel::replay::{decode_frames, encode_frame, EventLogHeader};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Format(#[from] KernelError),

    #[error("event log is in an unknown state after a failed append")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, EventLogError>;

/// Contents of an event log on disk.
#[derive(Debug, Default)]
pub struct LoadedLog {
    pub events: Vec<LedgerEvent>,
    /// Length of the valid prefix (header plus complete frames).
    pub valid_len: u64,
    pub torn_tail: bool,
}

/// Reads and decodes a whole event log. A missing or empty file is an empty log.
pub fn read_log(path: &Path) -> Result<LoadedLog> {
    if !path.exists() {
        return Ok(LoadedLog::default());
    }
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Ok(LoadedLog::default());
    }

    let (_, body) = EventLogHeader::read(&bytes)?;
    let frames = decode_frames(body)?;
    Ok(LoadedLog {
        events: frames.events,
        valid_len: (EventLogHeader::SIZE + frames.consumed) as u64,
        torn_tail: frames.torn_tail,
    })
}

/// Destination of an event log: a file in production.
pub trait LogSink: Write + Send {
    /// Makes everything written so far durable.
    fn sync(&mut self) -> std::io::Result<()>;

    /// Cuts the log back to `len` bytes.
    fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

impl LogSink for File {
    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_all()
    }

    fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len)?;
        self.sync_all()
    }
}

/// Append-Only Event Log Writer
///
/// Every `append` is written and fsync'd before it returns. A failed append
/// is cut back off the log, so a write reported as failed never reappears on
/// replay. If the cut itself fails the writer refuses all further appends.
pub struct EventLogWriter<W: LogSink = File> {
    path: PathBuf,
    sink: W,
    // Header plus every acknowledged frame.
    valid_len: u64,
    event_count: u64,
    poisoned: bool,
}

impl EventLogWriter<File> {
    /// Opens or creates an event log.
    ///
    /// An existing log is validated; a torn final frame left by a crash is cut
    /// off so new frames start on a clean boundary.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let existing = read_log(&path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        if existing.valid_len == 0 {
            file.set_len(0)?;
            file.write_all(&EventLogHeader::default().to_bytes())?;
            file.sync_all()?;
            return Ok(Self {
                path,
                sink: file,
                valid_len: EventLogHeader::SIZE as u64,
                event_count: 0,
                poisoned: false,
            });
        }

        if existing.torn_tail {
            tracing::warn!(
                "Event log {:?} has a torn final frame; truncating to {} bytes",
                path,
                existing.valid_len
            );
            file.set_len(existing.valid_len)?;
            file.sync_all()?;
        }

        Ok(Self {
            path,
            sink: file,
            valid_len: existing.valid_len,
            event_count: existing.events.len() as u64,
            poisoned: false,
        })
    }
}

impl<W: LogSink> EventLogWriter<W> {
    pub fn append(&mut self, event: &LedgerEvent) -> Result<()> {
        if self.poisoned {
            return Err(EventLogError::Poisoned);
        }
        let frame = encode_frame(event)?;

        let written = self
            .sink
            .write_all(&frame)
            .and_then(|_| self.sink.flush())
            .and_then(|_| self.sink.sync());
        if let Err(e) = written {
            self.roll_back();
            return Err(e.into());
        }

        self.valid_len += frame.len() as u64;
        self.event_count += 1;
        Ok(())
    }

    fn roll_back(&mut self) {
        if let Err(e) = self.sink.truncate(self.valid_len) {
            tracing::error!(
                "Could not cut failed append off {:?}: {}; refusing further writes",
                self.path,
                e
            );
            self.poisoned = true;
        }
    }

    /// Number of events in the log, including those present when it was opened.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
