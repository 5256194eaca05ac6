//! API route handlers
//!
//! This module contains all HTTP endpoint implementations for the
//! embedrelay server:
//!
//! - `embedding`: the batched embedding dispatch endpoint
//! - `health`: liveness and readiness probes

pub mod embedding;
pub mod health;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Embedrelay Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/functions/get_embedding",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
