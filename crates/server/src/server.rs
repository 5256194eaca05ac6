//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, compression, etc.)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{api_info, embedding, health, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: /, /health, /ready (no auth required)
/// - Function routes: /functions/* (API key required when keys are
///   configured; open otherwise)
///
/// Public for integration tests, which drive the router in-process instead
/// of binding a socket.
pub fn build_router(state: Arc<ServerState>) -> Router {
    // CORS layer
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check));

    // Function routes (auth applies only when keys are configured)
    let function_routes = Router::new()
        .route("/functions/get_embedding", post(embedding::get_embedding))
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(function_routes)
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(state.config.timeout_secs),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the embedrelay HTTP server
///
/// Initializes logging, builds the shared state (config plus both
/// embedding backends), binds the configured TCP address, and serves until
/// SIGTERM or Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    // Create server state
    let state = Arc::new(ServerState::new(config.clone())?);

    // Build router
    let app = build_router(state.clone());

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting embedrelay server on {} ({} API keys configured)",
        addr,
        config.api_keys.len()
    );
    tracing::info!(
        "Batch size: {}, max workers: {}",
        config.batch_size,
        config.max_workers
    );
    tracing::info!(
        "Local backend: {}, timeout: {}s, max body: {}MB",
        state.embedders.local_mode(),
        config.timeout_secs,
        config.max_body_size_mb
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
