//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::{HealthCheckResult, HealthCheckable};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheckResult>,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (probes every storage port)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let ports = &state.ports;
    let checks = vec![
        ports.items.health_check().await,
        ports.notifications.health_check().await,
        ports.users.health_check().await,
        ports.idempotency.health_check().await,
    ];

    let ready = checks.iter().all(|check| check.status.is_operational());
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(ReadinessResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks,
        }),
    )
}
