//! Embedrelay Server - HTTP API for batched embedding dispatch
//!
//! This crate provides the HTTP server that exposes the embedding pipeline
//! to database external-function callers. It supports:
//!
//! - **Embedding Dispatch**: Batched `(row_id, text, model_name)` triples
//!   fanned out across the remote and local backends
//! - **Health Probes**: Liveness and readiness endpoints reporting backend
//!   modes
//!
//! # Features
//!
//! - **Authentication**: Optional API key checking with per-key rate
//!   limiting; with no keys configured the endpoint is open
//! - **Middleware**: Compression, CORS, request ID tracking, structured
//!   logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Graceful Shutdown**: Proper signal handling for production
//!   deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `POST /functions/get_embedding` - Embedding dispatch (API key required
//!   only when keys are configured)

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
