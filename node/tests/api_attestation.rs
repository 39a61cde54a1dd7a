use attest_node::api::{
    AttestationResponse, CommitmentRequest, CommitmentResponse, CountResponse, OwnerResponse,
    OwnershipProofRequest, OwnershipProofResponse, ProofResponse, RecordRequest, RecordResponse,
    SnapshotSaveRequest, SnapshotSaveResponse, VerifiedResponse,
};
use attest_node::config::NodeConfig;
use attest_node::engine::Engine;
use attest_node::server::{build_router, IDENTITY_HEADER};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt; // for oneshot

const CONTENT: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
const SECRET: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";
const OWNER: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn app(auth_token: Option<String>) -> Router {
    let engine = Engine::open(&NodeConfig::default()).unwrap();
    build_router(Arc::new(engine), auth_token)
}

fn post_json(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

async fn commitment(app: &Router) -> String {
    let body = CommitmentRequest {
        content_id: CONTENT.to_string(),
        secret: SECRET.to_string(),
    };
    let req = post_json("/v1/commitments")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json::<CommitmentResponse>(response).await.commitment
}

async fn record(app: &Router, commitment: &str) -> axum::response::Response {
    let body = RecordRequest {
        content_id: CONTENT.to_string(),
        commitment: commitment.to_string(),
    };
    let req = post_json("/v1/attestations")
        .header(IDENTITY_HEADER, OWNER)
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

#[tokio::test]
async fn test_record_then_query() {
    let app = app(None);
    let h = commitment(&app).await;

    let response = record(&app, &h).await;
    assert_eq!(response.status(), StatusCode::OK);
    let recorded: RecordResponse = read_json(response).await;
    assert_eq!(recorded.owner, OWNER);
    assert!(recorded.verified_at > 0);

    let response = get(&app, &format!("/v1/attestations/{}", CONTENT)).await;
    let att: AttestationResponse = read_json(response).await;
    assert_eq!(att.commitment, h);
    assert_eq!(att.owner, OWNER);
    assert_eq!(att.verified_at, recorded.verified_at);

    let verified: VerifiedResponse = read_json(get(&app, &format!("/v1/attestations/{}/verified", CONTENT)).await).await;
    assert!(verified.verified);

    let owner: OwnerResponse = read_json(get(&app, &format!("/v1/attestations/{}/owner", CONTENT)).await).await;
    assert_eq!(owner.owner, OWNER);

    let count: CountResponse = read_json(get(&app, &format!("/v1/owners/{}/count", OWNER)).await).await;
    assert_eq!(count.count, 1);

    let total: CountResponse = read_json(get(&app, "/v1/stats/total").await).await;
    assert_eq!(total.count, 1);
}

#[tokio::test]
async fn test_ownership_proof_endpoint() {
    let app = app(None);
    let h = commitment(&app).await;
    assert_eq!(record(&app, &h).await.status(), StatusCode::OK);

    for (secret, expected) in [(SECRET, true), (CONTENT, false)] {
        let body = OwnershipProofRequest {
            secret: secret.to_string(),
        };
        let req = post_json(&format!("/v1/attestations/{}/ownership-proof", CONTENT))
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let proof: OwnershipProofResponse = read_json(response).await;
        assert_eq!(proof.valid, expected);
    }
}

#[tokio::test]
async fn test_absent_attestation_is_zero_form() {
    let app = app(None);
    let response = get(&app, &format!("/v1/attestations/{}", CONTENT)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let att: AttestationResponse = read_json(response).await;
    assert_eq!(att.verified_at, 0);
    assert_eq!(att.owner, "00".repeat(20));
    assert_eq!(att.commitment, "00".repeat(32));
}

#[tokio::test]
async fn test_missing_identity_header_is_bad_request() {
    let app = app(None);
    let body = RecordRequest {
        content_id: CONTENT.to_string(),
        commitment: SECRET.to_string(),
    };
    let req = post_json("/v1/attestations")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let total: CountResponse = read_json(get(&app, "/v1/stats/total").await).await;
    assert_eq!(total.count, 0);
}

#[tokio::test]
async fn test_malformed_hex_is_bad_request() {
    let app = app(None);
    assert_eq!(get(&app, "/v1/attestations/0x1234").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/v1/owners/not-hex/count").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(record(&app, "0xabc").await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_guard() {
    let app = app(Some("secret-token".to_string()));

    assert_eq!(get(&app, "/v1/stats/total").await.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/v1/stats/total")
        .header("authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/v1/stats/total")
        .header("authorization", "Bearer secret-token")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_proof_endpoint() {
    let app = app(None);
    let h = commitment(&app).await;
    record(&app, &h).await;

    let response = get(&app, "/v1/proof/state").await;
    assert_eq!(response.status(), StatusCode::OK);
    let proof: ProofResponse = read_json(response).await;
    assert_eq!(proof.kernel_version, 1);
    assert_eq!(proof.event_count, 1);
    assert_eq!(proof.final_state_hash.len(), 64);
    assert!(proof.snapshot_hash.is_none());
}

#[tokio::test]
async fn test_record_response_echoes_canonical_owner() {
    let app = app(None);
    let h = commitment(&app).await;
    let body = RecordRequest {
        content_id: CONTENT.to_uppercase().replacen("0X", "0x", 1),
        commitment: h,
    };
    let req = post_json("/v1/attestations")
        .header(IDENTITY_HEADER, format!("0x{}", OWNER.to_uppercase()))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let recorded: RecordResponse = read_json(response).await;
    assert_eq!(recorded.owner, OWNER);
    assert_eq!(recorded.content_id, CONTENT.trim_start_matches("0x"));

    let owner: OwnerResponse = read_json(get(&app, &format!("/v1/attestations/{}/owner", CONTENT)).await).await;
    assert_eq!(owner.owner, recorded.owner);
}

#[tokio::test]
async fn test_snapshot_save_only_accepts_bare_file_names() {
    let dir = tempdir().unwrap();
    let mut cfg = NodeConfig::default();
    cfg.snapshot_path = Some(dir.path().join("ledger.snap"));
    let app = build_router(Arc::new(Engine::open(&cfg).unwrap()), None);

    let save = |path: Option<&str>| {
        let body = SnapshotSaveRequest {
            path: path.map(str::to_string),
        };
        post_json("/v1/snapshot/save")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    };

    let response = app.clone().oneshot(save(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(dir.path().join("ledger.snap").exists());

    let response = app.clone().oneshot(save(Some("manual.snap"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved: SnapshotSaveResponse = read_json(response).await;
    assert_eq!(std::path::PathBuf::from(saved.path), dir.path().join("manual.snap"));

    let outside = dir.path().join("elsewhere.snap");
    let response = app.clone().oneshot(save(Some(outside.to_str().unwrap()))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!outside.exists());

    let response = app.clone().oneshot(save(Some("../escape.snap"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
