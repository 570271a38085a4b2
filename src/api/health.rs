//! Health check endpoints

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;
use crate::domain::storage::{Record, StorageId};
use crate::domain::user::SESSIONS_BIN;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageCheck>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
pub struct StorageCheck {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Liveness check - returns 200 while the process is serving
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check - issues a lookup against the storage backend
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let probe = StorageId::from("readiness-probe");
    let result = state
        .storage
        .retrieve(SESSIONS_BIN, Some(probe), &Record::new())
        .await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let storage = match result {
        Ok(_) => StorageCheck {
            status: HealthStatus::Healthy,
            message: None,
            latency_ms,
        },
        Err(e) => StorageCheck {
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
            latency_ms,
        },
    };

    let status = storage.status;
    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: Some(storage),
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Unhealthy).unwrap(), "\"unhealthy\"");
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "1.0.0".to_string(),
            storage: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(!json.contains("storage"));
    }

    #[test]
    fn test_unhealthy_storage_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Unhealthy,
            version: "1.0.0".to_string(),
            storage: Some(StorageCheck {
                status: HealthStatus::Unhealthy,
                message: Some("Connection refused".to_string()),
                latency_ms: 100,
            }),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["storage"]["status"], "unhealthy");
        assert_eq!(json["storage"]["message"], "Connection refused");
    }
}
