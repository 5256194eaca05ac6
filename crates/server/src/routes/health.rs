use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(json!({
        "status": "healthy",
        "service": "embedrelay-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}

/// Readiness check endpoint
///
/// Reports the effective backend modes so operators can tell a stubbed
/// deployment from a real one without sending traffic.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let uptime = SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let remote_status = if state.embedders.remote_has_credential() {
        "configured"
    } else {
        "no credential"
    };

    Ok(Json(json!({
        "status": "ready",
        "service": "embedrelay-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
        "components": {
            "api": "ready",
            "local_backend": state.embedders.local_mode(),
            "remote_backend": remote_status,
        }
    })))
}
