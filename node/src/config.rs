// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} is not a whole number of seconds: {value}")]
    InvalidInterval { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    /// Bearer token required on every request. `None` disables the guard.
    pub auth_token: Option<String>,
    /// Append-only event log. `None` keeps the ledger in memory only.
    pub event_log_path: Option<PathBuf>,
    pub snapshot_path: Option<PathBuf>,
    pub auto_snapshot_interval_secs: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            auth_token: None,
            event_log_path: None,
            snapshot_path: None,
            auto_snapshot_interval_secs: None,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `ATTEST_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(value) = lookup("ATTEST_BIND_ADDR") {
            cfg.bind_addr = value.parse().map_err(|_| ConfigError::InvalidAddr {
                var: "ATTEST_BIND_ADDR",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("ATTEST_AUTH_TOKEN").filter(|v| !v.is_empty()) {
            cfg.auth_token = Some(value);
        }
        if let Some(value) = lookup("ATTEST_EVENT_LOG").filter(|v| !v.is_empty()) {
            cfg.event_log_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("ATTEST_SNAPSHOT").filter(|v| !v.is_empty()) {
            cfg.snapshot_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("ATTEST_SNAPSHOT_INTERVAL_SECS") {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::InvalidInterval {
                var: "ATTEST_SNAPSHOT_INTERVAL_SECS",
                value: value.clone(),
            })?;
            cfg.auto_snapshot_interval_secs = Some(secs).filter(|s| *s > 0);
        }

        Ok(cfg)
    }
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("bind_addr", &self.bind_addr)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("event_log_path", &self.event_log_path)
            .field("snapshot_path", &self.snapshot_path)
            .field("auto_snapshot_interval_secs", &self.auto_snapshot_interval_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let cfg = NodeConfig::from_lookup(lookup_from(&[
            ("ATTEST_BIND_ADDR", "0.0.0.0:8080"),
            ("ATTEST_AUTH_TOKEN", "s3cret"),
            ("ATTEST_EVENT_LOG", "/var/lib/attest/events.log"),
            ("ATTEST_SNAPSHOT_INTERVAL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(cfg.event_log_path, Some(PathBuf::from("/var/lib/attest/events.log")));
        assert_eq!(cfg.snapshot_path, None);
        assert_eq!(cfg.auto_snapshot_interval_secs, Some(60));

        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(matches!(
            NodeConfig::from_lookup(lookup_from(&[("ATTEST_BIND_ADDR", "nope")])),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            NodeConfig::from_lookup(lookup_from(&[("ATTEST_SNAPSHOT_INTERVAL_SECS", "-1")])),
            Err(ConfigError::InvalidInterval { .. })
        ));
    }
}
