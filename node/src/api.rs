// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! JSON request/response bodies. Fixed-width values travel as hex strings.
use attest_kernel::proof::LedgerProof;
use attest_kernel::storage::record::AttestationRecord;
use attest_kernel::types::ContentId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct RecordRequest {
    pub content_id: String,
    pub commitment: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RecordResponse {
    pub content_id: String,
    pub owner: String,
    pub verified_at: u64,
}

/// An attestation; all zeros when nothing has been recorded.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct AttestationResponse {
    pub content_id: String,
    pub verified_at: u64,
    pub owner: String,
    pub commitment: String,
}

impl AttestationResponse {
    pub fn new(content_id: &ContentId, record: &AttestationRecord) -> Self {
        Self {
            content_id: content_id.to_hex(),
            verified_at: record.verified_at.as_secs(),
            owner: record.owner.to_hex(),
            commitment: record.commitment.to_hex(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct VerifiedResponse {
    pub verified: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OwnerResponse {
    pub owner: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OwnershipProofRequest {
    pub secret: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct OwnershipProofResponse {
    pub valid: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CommitmentRequest {
    pub content_id: String,
    pub secret: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CommitmentResponse {
    pub commitment: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProofResponse {
    pub kernel_version: u64,
    pub snapshot_hash: Option<String>,
    pub event_log_hash: String,
    pub final_state_hash: String,
    pub event_count: u64,
}

impl From<LedgerProof> for ProofResponse {
    fn from(proof: LedgerProof) -> Self {
        Self {
            kernel_version: proof.kernel_version,
            snapshot_hash: proof.snapshot_hash.map(hex::encode),
            event_log_hash: hex::encode(proof.event_log_hash),
            final_state_hash: hex::encode(proof.final_state_hash),
            event_count: proof.event_count,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SnapshotSaveRequest {
    /// File name to save under, next to the configured snapshot.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SnapshotSaveResponse {
    pub success: bool,
    pub path: String,
    pub event_height: u64,
    pub state_hash: String,
    pub size_bytes: u64,
}
