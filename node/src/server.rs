// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::{
    extract::{Path, Request as AxumRequest, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::*;
use crate::engine::Engine;
use crate::errors::EngineError;

pub type SharedEngine = Arc<Engine>;

/// Header carrying the submitter identity, set by the authenticating front end.
pub const IDENTITY_HEADER: &str = "x-attest-identity";

async fn auth_guard(
    State(token): State<Arc<String>>,
    req: AxumRequest,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "));

    match provided {
        Some(p) if p == token.as_str() => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

pub fn build_router(state: SharedEngine, auth_token: Option<String>) -> Router {
    let mut app = Router::new()
        .route("/v1/attestations", post(record_attestation))
        .route("/v1/attestations/:content_id", get(get_attestation))
        .route("/v1/attestations/:content_id/verified", get(is_verified))
        .route("/v1/attestations/:content_id/owner", get(get_owner))
        .route("/v1/attestations/:content_id/ownership-proof", post(verify_ownership_proof))
        .route("/v1/owners/:identity/count", get(owner_count))
        .route("/v1/stats/total", get(total_count))
        .route("/v1/commitments", post(compute_commitment))
        .route("/v1/proof/state", get(get_proof))
        .route("/v1/snapshot/save", post(snapshot_save))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    if let Some(token) = auth_token {
        tracing::info!("Auth Enabled: Bearer token required");
        app = app.layer(from_fn_with_state(Arc::new(token), auth_guard));
    } else {
        tracing::warn!("Auth Disabled: No token configured");
    }

    app.layer(TraceLayer::new_for_http())
}

fn submitter(headers: &HeaderMap) -> Result<String, EngineError> {
    let value = headers
        .get(IDENTITY_HEADER)
        .ok_or_else(|| EngineError::InvalidInput(format!("missing {} header", IDENTITY_HEADER)))?;
    value
        .to_str()
        .map(str::to_owned)
        .map_err(|_| EngineError::InvalidInput(format!("{} header is not valid text", IDENTITY_HEADER)))
}

// Writes fsync the event log, so keep them off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, EngineError>
where
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Blocking task failed: {}", e);
        EngineError::Internal
    })?
}

async fn record_attestation(
    State(state): State<SharedEngine>,
    headers: HeaderMap,
    Json(payload): Json<RecordRequest>,
) -> Result<Json<RecordResponse>, EngineError> {
    let submitter = submitter(&headers)?;
    let engine = state.clone();
    let recorded = blocking(move || engine.record(&submitter, &payload.content_id, &payload.commitment)).await?;

    Ok(Json(RecordResponse {
        content_id: recorded.content_id.to_hex(),
        owner: recorded.owner.to_hex(),
        verified_at: recorded.verified_at.as_secs(),
    }))
}

async fn get_attestation(
    State(state): State<SharedEngine>,
    Path(content_id): Path<String>,
) -> Result<Json<AttestationResponse>, EngineError> {
    let (id, record) = state.attestation(&content_id)?;
    Ok(Json(AttestationResponse::new(&id, &record)))
}

async fn is_verified(
    State(state): State<SharedEngine>,
    Path(content_id): Path<String>,
) -> Result<Json<VerifiedResponse>, EngineError> {
    let verified = state.is_verified(&content_id)?;
    Ok(Json(VerifiedResponse { verified }))
}

async fn get_owner(
    State(state): State<SharedEngine>,
    Path(content_id): Path<String>,
) -> Result<Json<OwnerResponse>, EngineError> {
    let owner = state.owner(&content_id)?;
    Ok(Json(OwnerResponse { owner: owner.to_hex() }))
}

async fn verify_ownership_proof(
    State(state): State<SharedEngine>,
    Path(content_id): Path<String>,
    Json(payload): Json<OwnershipProofRequest>,
) -> Result<Json<OwnershipProofResponse>, EngineError> {
    let valid = state.verify_ownership_proof(&content_id, &payload.secret)?;
    Ok(Json(OwnershipProofResponse { valid }))
}

async fn owner_count(
    State(state): State<SharedEngine>,
    Path(identity): Path<String>,
) -> Result<Json<CountResponse>, EngineError> {
    let count = state.owner_count(&identity)?;
    Ok(Json(CountResponse { count }))
}

async fn total_count(State(state): State<SharedEngine>) -> Result<Json<CountResponse>, EngineError> {
    let count = state.total_count()?;
    Ok(Json(CountResponse { count }))
}

async fn compute_commitment(
    State(state): State<SharedEngine>,
    Json(payload): Json<CommitmentRequest>,
) -> Result<Json<CommitmentResponse>, EngineError> {
    let commitment = state.compute_commitment(&payload.content_id, &payload.secret)?;
    Ok(Json(CommitmentResponse {
        commitment: commitment.to_hex(),
    }))
}

async fn get_proof(State(state): State<SharedEngine>) -> Result<Json<ProofResponse>, EngineError> {
    let engine = state.clone();
    let proof = blocking(move || engine.get_proof()).await?;
    Ok(Json(proof.into()))
}

async fn snapshot_save(
    State(state): State<SharedEngine>,
    Json(req): Json<SnapshotSaveRequest>,
) -> Result<Json<SnapshotSaveResponse>, EngineError> {
    let engine = state.clone();
    let saved = blocking(move || {
        let path = req.path.as_deref().map(|name| engine.snapshot_path_for(name)).transpose()?;
        engine.save_snapshot(path.as_deref())
    })
    .await?;

    Ok(Json(SnapshotSaveResponse {
        success: true,
        path: saved.path.to_string_lossy().to_string(),
        event_height: saved.event_height,
        state_hash: hex::encode(saved.state_hash),
        size_bytes: saved.size_bytes,
    }))
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
