//! Embedrelay Server - HTTP API for batched embedding dispatch
//!
//! This binary serves the external-function endpoint that turns
//! `(row_id, text, model_name)` triples into embedding vectors.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
