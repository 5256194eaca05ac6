use serde_json::{json, Value};
use std::time::Duration;

use crate::config::RemoteConfig;
use crate::EmbeddingError;

/// The `openai_embedding` backend: one HTTP call per batch against an
/// OpenAI-compatible `/v1/embeddings` endpoint.
///
/// The whole filtered batch goes out as a single request. Any failure
/// (transport, status, body shape, count mismatch) fails the batch as a
/// unit; there is no retry and no partial salvage. Vectors come back
/// exactly as the provider produced them, which for this endpoint means
/// not necessarily unit length.
pub struct RemoteBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl RemoteBackend {
    pub fn new(cfg: &RemoteConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    /// Whether a credential is configured. Requests still go out without
    /// one (the endpoint may be a local proxy), surfaced on readiness.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Embed the whole batch in one request. Returns exactly one vector per
    /// input text or fails the batch.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({ "input": texts, "model": self.model });
        let mut request = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json");
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request
            .json(&payload)
            .send()
            .await
            .map_err(|e| EmbeddingError::Api(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("http {status}: {body}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Api(format!("invalid json response: {e}")))?;

        let vectors = parse_embedding_response(body)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Api(format!(
                "api returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

/// Pull the vectors out of an OpenAI-shaped response:
/// `{"data": [{"embedding": [...]}, ...]}`.
fn parse_embedding_response(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let Value::Object(mut map) = value else {
        return Err(EmbeddingError::Api("response is not a json object".into()));
    };

    let Some(Value::Array(items)) = map.remove("data") else {
        return Err(EmbeddingError::Api(
            "response is missing the `data` array".into(),
        ));
    };

    let mut vectors = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(mut obj) => {
                let embedding = obj.remove("embedding").ok_or_else(|| {
                    EmbeddingError::Api("missing `embedding` field in data item".into())
                })?;
                vectors.push(parse_embedding_vector(embedding)?);
            }
            _ => {
                return Err(EmbeddingError::Api(
                    "unexpected entry inside `data` array".into(),
                ))
            }
        }
    }
    Ok(vectors)
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbeddingError::Api("non-finite embedding value".into())),
                other => Err(EmbeddingError::Api(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(EmbeddingError::Api(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}
