// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use attest_kernel::config::KERNEL_VERSION;
use attest_kernel::proof::LedgerProof;
use attest_kernel::storage::record::AttestationRecord;
use attest_kernel::types::{Commitment, ContentId, Identity, Secret, Timestamp};
use attest_kernel::verify::snapshot_hash;
use attest_kernel::{compute_commitment, Clock, Ledger, SystemClock};

use crate::config::NodeConfig;
use crate::errors::EngineError;
use crate::events::{DurableStore, LedgerCapture};
use crate::persistence::{SnapshotManager, SnapshotMeta};
use crate::recovery::recover;

use parking_lot::Mutex;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

/// Result of a snapshot save.
#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub path: PathBuf,
    pub event_height: u64,
    pub state_hash: [u8; 32],
    pub size_bytes: u64,
}

/// A write as the ledger stored it, in canonical form.
#[derive(Debug, Clone, Copy)]
pub struct Recorded {
    pub content_id: ContentId,
    pub owner: Identity,
    pub verified_at: Timestamp,
}

/// Service-side ledger: the kernel ledger over a durable store, with the
/// snapshot bookkeeping needed to answer proof requests.
pub struct Engine {
    ledger: Ledger<DurableStore, SystemClock>,
    pub snapshot_path: Option<PathBuf>,
    // Hash of the kernel snapshot bytes a replay should start from.
    base_snapshot_hash: Mutex<Option<[u8; 32]>>,
}

impl Engine {
    /// Recovers state from the configured snapshot and event log and opens
    /// the log for appending.
    pub fn open(cfg: &NodeConfig) -> Result<Self, EngineError> {
        let recovered = recover(cfg.snapshot_path.as_deref(), cfg.event_log_path.as_deref())?;
        let base_snapshot_hash = recovered.base_snapshot_hash();

        let store = match recovered.writer {
            Some(writer) => DurableStore::with_log(recovered.state, writer),
            None => DurableStore::in_memory(recovered.state),
        };

        Ok(Self {
            ledger: Ledger::new(store, SystemClock::new()),
            snapshot_path: cfg.snapshot_path.clone(),
            base_snapshot_hash: Mutex::new(base_snapshot_hash),
        })
    }

    pub fn ledger(&self) -> &Ledger<DurableStore, SystemClock> {
        &self.ledger
    }

    pub fn store(&self) -> &DurableStore {
        self.ledger.store()
    }

    /// Records `commitment` for `content_id` on behalf of `submitter`.
    pub fn record(&self, submitter: &str, content_id: &str, commitment: &str) -> Result<Recorded, EngineError> {
        let submitter = Identity::from_hex(submitter)?;
        let content_id = ContentId::from_hex(content_id)?;
        let commitment = Commitment::from_hex(commitment)?;

        let start = Instant::now();
        let verified_at = self.ledger.session(submitter).attest(content_id, commitment)?;

        metrics::increment_counter!("attest_records_total");
        metrics::histogram!("attest_record_duration_seconds", start.elapsed().as_secs_f64());
        Ok(Recorded {
            content_id,
            owner: submitter,
            verified_at,
        })
    }

    /// The parsed key and its stored record, or the zero form when absent.
    pub fn attestation(&self, content_id: &str) -> Result<(ContentId, AttestationRecord), EngineError> {
        let content_id = ContentId::from_hex(content_id)?;
        let record = self.ledger.get_attestation(&content_id)?.unwrap_or_default();
        Ok((content_id, record))
    }

    pub fn is_verified(&self, content_id: &str) -> Result<bool, EngineError> {
        let content_id = ContentId::from_hex(content_id)?;
        Ok(self.ledger.is_verified(&content_id)?)
    }

    /// The recorded owner, or the all-zero identity when absent.
    pub fn owner(&self, content_id: &str) -> Result<Identity, EngineError> {
        let content_id = ContentId::from_hex(content_id)?;
        Ok(self.ledger.get_owner(&content_id)?.unwrap_or_default())
    }

    pub fn verify_ownership_proof(&self, content_id: &str, secret: &str) -> Result<bool, EngineError> {
        let content_id = ContentId::from_hex(content_id)?;
        let secret = Secret::from_hex(secret)?;

        let valid = self.ledger.verify_ownership_proof(&content_id, &secret)?;
        let result = if valid { "valid" } else { "invalid" };
        metrics::increment_counter!("attest_ownership_checks_total", "result" => result);
        Ok(valid)
    }

    pub fn owner_count(&self, identity: &str) -> Result<u64, EngineError> {
        let identity = Identity::from_hex(identity)?;
        Ok(self.ledger.get_owner_attestation_count(&identity)?)
    }

    pub fn total_count(&self) -> Result<u64, EngineError> {
        Ok(self.ledger.get_total_attestation_count()?)
    }

    /// Client helper; never touches the ledger.
    pub fn compute_commitment(&self, content_id: &str, secret: &str) -> Result<Commitment, EngineError> {
        let content_id = ContentId::from_hex(content_id)?;
        let secret = Secret::from_hex(secret)?;
        Ok(compute_commitment(&content_id, &secret))
    }

    pub fn get_proof(&self) -> Result<LedgerProof, EngineError> {
        let capture = self.store().capture()?;
        Ok(LedgerProof {
            kernel_version: KERNEL_VERSION,
            snapshot_hash: *self.base_snapshot_hash.lock(),
            event_log_hash: capture.event_log_hash,
            final_state_hash: capture.state_hash,
            event_count: capture.event_count,
        })
    }

    /// Kernel snapshot bytes of the current state.
    pub fn snapshot(&self) -> Result<Vec<u8>, EngineError> {
        Ok(self.store().capture()?.snapshot)
    }

    /// Resolves a client-supplied snapshot file name. Only bare file names are
    /// accepted, and they land next to the configured snapshot.
    pub fn snapshot_path_for(&self, file_name: &str) -> Result<PathBuf, EngineError> {
        let configured = self
            .snapshot_path
            .as_deref()
            .ok_or_else(|| EngineError::InvalidInput("No snapshot path configured".to_string()))?;

        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(configured.with_file_name(name)),
            _ => Err(EngineError::InvalidInput(format!(
                "snapshot name must be a bare file name, got {:?}",
                file_name
            ))),
        }
    }

    pub fn save_snapshot(&self, path_override: Option<&Path>) -> Result<SavedSnapshot, EngineError> {
        let path = path_override
            .or(self.snapshot_path.as_deref())
            .ok_or_else(|| EngineError::InvalidInput("No snapshot path configured".to_string()))?;

        let LedgerCapture {
            snapshot,
            state_hash,
            event_count,
            ..
        } = self.store().capture()?;

        let timestamp = self.ledger.clock().now().as_secs();
        let mut meta = SnapshotMeta::new(timestamp, event_count, state_hash);
        SnapshotManager::save(path, &snapshot, &mut meta)?;

        let size_bytes = std::fs::metadata(path)?.len();
        metrics::gauge!("attest_snapshot_size_bytes", size_bytes as f64);

        // Only a snapshot taken alongside a durable log can seed a replay.
        if self.store().is_durable() {
            *self.base_snapshot_hash.lock() = Some(snapshot_hash(&snapshot));
        }

        tracing::info!("Snapshot saved to {:?} at height {} ({} bytes)", path, event_count, size_bytes);
        Ok(SavedSnapshot {
            path: path.to_path_buf(),
            event_height: event_count,
            state_hash,
            size_bytes,
        })
    }
}
