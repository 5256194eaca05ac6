//! Example client for the embedrelay server API

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Dispatch a mixed batch of rows
    println!("2. Get Embeddings:");
    let resp = client
        .post(format!("{SERVER_URL}/functions/get_embedding"))
        .json(&json!({
            "data": [
                [101, "hello world", "hf_embedding"],
                [102, "bonjour le monde", "openai_embedding"],
                [103, "", "hf_embedding"]
            ]
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Readiness probe reports backend modes
    println!("3. Readiness:");
    let resp = client.get(format!("{SERVER_URL}/ready")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}
