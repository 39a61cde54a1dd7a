// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use attest_node::config::NodeConfig;
use attest_node::engine::Engine;
use attest_node::server::{build_router, SharedEngine};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    attest_node::telemetry::init_telemetry()?;

    let cfg = NodeConfig::from_env()?;
    tracing::info!("Initializing Attest Node with config: {:?}", cfg);

    let engine = Engine::open(&cfg).map_err(|e| {
        tracing::error!("Recovery failed: {}", e);
        e
    })?;
    let shared_state: SharedEngine = Arc::new(engine);

    if let (Some(path), Some(secs)) = (cfg.snapshot_path.clone(), cfg.auto_snapshot_interval_secs) {
        let state_clone = shared_state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(secs));
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                tracing::debug!("Auto-snapshotting...");
                let engine = state_clone.clone();
                let path = path.clone();
                match tokio::task::spawn_blocking(move || engine.save_snapshot(Some(&path))).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::error!("Snapshot failed: {}", e),
                    Err(e) => tracing::error!("Snapshot task panicked: {}", e),
                }
            }
        });
    }

    let app = build_router(shared_state, cfg.auth_token.clone());

    let addr = cfg.bind_addr;
    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
