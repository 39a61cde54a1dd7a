// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::OnceLock;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() -> Result<(), BuildError> {
    // 1. Tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("attest_node=debug,tower_http=debug"));
    if tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_err()
    {
        tracing::warn!("Tracing subscriber already installed");
    }

    // 2. Prometheus
    let handle = PrometheusBuilder::new().install_recorder()?;
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!("attest_records_total", "Total number of attestations recorded");
    metrics::describe_counter!(
        "attest_ownership_checks_total",
        "Ownership proof checks, labelled by result"
    );
    metrics::describe_histogram!("attest_record_duration_seconds", "Time taken to durably record an attestation");
    metrics::describe_gauge!("attest_snapshot_size_bytes", "Size of the last saved snapshot in bytes");
    metrics::describe_histogram!("attest_replay_duration_seconds", "Time taken to recover from snapshot and event log");

    metrics::gauge!("attest_node_up", 1.0);
    Ok(())
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    match PROM_HANDLE.get() {
        Some(handle) => handle.render(),
        None => "# metrics not initialized".to_string(),
    }
}
