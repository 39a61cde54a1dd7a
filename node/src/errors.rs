// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use attest_kernel::error::KernelError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::events::event_log::EventLogError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),
    #[error("Snapshot error: {0}")]
    Snapshot(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            EngineError::Kernel(k_err) => match k_err {
                KernelError::MalformedInput { .. } => (StatusCode::BAD_REQUEST, k_err.to_string()),
                KernelError::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, k_err.to_string()),
                KernelError::CorruptSnapshot(_)
                | KernelError::CorruptEventLog(_)
                | KernelError::InvariantViolation(_) => {
                    tracing::error!("Ledger integrity error: {}", k_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Ledger integrity error".to_string())
                }
            },
            EngineError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            EngineError::EventLog(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("storage unavailable: {}", e)),
            EngineError::Snapshot(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            EngineError::Io(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("storage unavailable: {}", e)),
            EngineError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
