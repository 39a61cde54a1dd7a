use attest_kernel::replay::replay_and_hash;
use attest_node::config::NodeConfig;
use attest_node::engine::Engine;
use attest_node::errors::EngineError;
use std::path::Path;
use tempfile::tempdir;

const OWNER: &str = "0x00000000000000000000000000000000000000aa";

fn content(n: u8) -> String {
    hex::encode([n; 32])
}

fn config(dir: &Path) -> NodeConfig {
    let mut cfg = NodeConfig::default();
    cfg.event_log_path = Some(dir.join("events.log"));
    cfg.snapshot_path = Some(dir.join("ledger.snap"));
    cfg
}

fn fill(engine: &Engine, range: std::ops::RangeInclusive<u8>) {
    for n in range {
        let c = engine.compute_commitment(&content(n), &content(n)).unwrap().to_hex();
        engine.record(OWNER, &content(n), &c).unwrap();
    }
}

#[test]
fn test_restart_recovers_from_event_log() {
    let dir = tempdir().unwrap();
    let cfg = config(dir.path());

    let before = {
        let engine = Engine::open(&cfg).unwrap();
        fill(&engine, 1..=5);
        engine.get_proof().unwrap().final_state_hash
    };

    let engine = Engine::open(&cfg).unwrap();
    assert_eq!(engine.total_count().unwrap(), 5);
    assert_eq!(engine.owner_count(OWNER).unwrap(), 5);
    assert!(engine.verify_ownership_proof(&content(3), &content(3)).unwrap());
    assert_eq!(engine.get_proof().unwrap().final_state_hash, before);
}

#[test]
fn test_restart_recovers_from_snapshot_and_log_tail() {
    let dir = tempdir().unwrap();
    let cfg = config(dir.path());

    let before = {
        let engine = Engine::open(&cfg).unwrap();
        fill(&engine, 1..=3);
        let saved = engine.save_snapshot(None).unwrap();
        assert_eq!(saved.event_height, 3);
        assert!(saved.size_bytes > 0);
        fill(&engine, 4..=6);
        engine.get_proof().unwrap()
    };
    assert!(before.snapshot_hash.is_some());

    let engine = Engine::open(&cfg).unwrap();
    let after = engine.get_proof().unwrap();
    assert_eq!(engine.total_count().unwrap(), 6);
    assert_eq!(after.final_state_hash, before.final_state_hash);
    assert_eq!(after.snapshot_hash, before.snapshot_hash);

    // Writes keep landing after recovery.
    fill(&engine, 7..=7);
    assert_eq!(engine.total_count().unwrap(), 7);
}

#[test]
fn test_proof_replays_from_saved_snapshot() {
    let dir = tempdir().unwrap();
    let cfg = config(dir.path());
    let engine = Engine::open(&cfg).unwrap();
    fill(&engine, 1..=4);
    engine.save_snapshot(None).unwrap();
    fill(&engine, 5..=6);

    let proof = engine.get_proof().unwrap();
    let kernel_snapshot = engine.snapshot().unwrap();
    let log_bytes = std::fs::read(dir.path().join("events.log")).unwrap();

    assert_eq!(replay_and_hash(&kernel_snapshot, &log_bytes).unwrap(), proof.final_state_hash);
    assert_eq!(replay_and_hash(&[], &log_bytes).unwrap(), proof.final_state_hash);
}

#[test]
fn test_corrupted_snapshot_fails_recovery() {
    let dir = tempdir().unwrap();
    let cfg = config(dir.path());
    {
        let engine = Engine::open(&cfg).unwrap();
        fill(&engine, 1..=2);
        engine.save_snapshot(None).unwrap();
    }

    let snap = dir.path().join("ledger.snap");
    let mut bytes = std::fs::read(&snap).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    std::fs::write(&snap, &bytes).unwrap();

    assert!(matches!(Engine::open(&cfg), Err(EngineError::Snapshot(_))));
}

#[test]
fn test_truncated_snapshot_fails_recovery() {
    let dir = tempdir().unwrap();
    let cfg = config(dir.path());
    {
        let engine = Engine::open(&cfg).unwrap();
        fill(&engine, 1..=2);
        engine.save_snapshot(None).unwrap();
    }

    let snap = dir.path().join("ledger.snap");
    let bytes = std::fs::read(&snap).unwrap();
    std::fs::write(&snap, &bytes[..bytes.len() - 10]).unwrap();

    assert!(Engine::open(&cfg).is_err());
}

#[test]
fn test_torn_log_tail_is_dropped_on_restart() {
    let dir = tempdir().unwrap();
    let cfg = config(dir.path());
    {
        let engine = Engine::open(&cfg).unwrap();
        fill(&engine, 1..=3);
    }

    // Crash mid-append: a frame header promising more bytes than follow.
    let log = dir.path().join("events.log");
    let mut bytes = std::fs::read(&log).unwrap();
    bytes.extend_from_slice(&[64, 0, 0, 0, 9, 9]);
    std::fs::write(&log, &bytes).unwrap();

    let engine = Engine::open(&cfg).unwrap();
    assert_eq!(engine.total_count().unwrap(), 3);
    fill(&engine, 4..=4);
    drop(engine);

    let engine = Engine::open(&cfg).unwrap();
    assert_eq!(engine.total_count().unwrap(), 4);
}
