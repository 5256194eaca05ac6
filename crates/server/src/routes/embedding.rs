use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use embedrelay::{dispatch_batches, plan_batches, worker_count, RowCell};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Wire request: `{"data": [[row_id, text, model_name], ...]}`.
///
/// Row ids are opaque JSON scalars and pass through untouched. Texts and
/// model names are expected to be strings; anything else degrades to a
/// filtered row or an invalid model rather than rejecting the request.
#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    pub data: Vec<(Value, Value, Value)>,
}

/// Wire response: `{"data": [[row_id, "<json vector or []>"], ...]}`.
///
/// Each vector is serialized to a JSON string inside the outer JSON
/// response. The double encoding is what existing callers parse, so it
/// stays.
#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub data: Vec<(Value, String)>,
}

/// Dispatch a batch of rows to the embedding backends.
///
/// Rows are deinterleaved, grouped into single-model batches, embedded
/// concurrently, and zipped back against their row ids in input order.
/// Rows that were filtered out or whose batch failed come back as `"[]"`;
/// the response always carries every input row id, and the status is
/// always 200 for well-formed payloads.
pub async fn get_embedding(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<EmbeddingRequest>,
) -> ServerResult<impl IntoResponse> {
    let started = Instant::now();

    let mut row_ids = Vec::with_capacity(request.data.len());
    let mut rows = Vec::with_capacity(request.data.len());
    for (row_id, text, model_name) in request.data {
        row_ids.push(row_id);
        rows.push(RowCell {
            text: match text {
                Value::String(s) => Some(s),
                _ => None,
            },
            // A non-string model name routes nowhere, same as an unknown one.
            model_name: match model_name {
                Value::String(s) => s,
                _ => String::new(),
            },
        });
    }

    let batches = plan_batches(&rows, state.config.batch_size)?;
    let workers = worker_count(rows.len(), state.config.batch_size, state.config.max_workers);
    let outcomes = dispatch_batches(batches, &state.embedders, workers).await;

    // The planner covers every row and the router returns one outcome per
    // row, so this zip is total: no truncation, no padding needed.
    if outcomes.len() != row_ids.len() {
        return Err(ServerError::Internal(format!(
            "outcome count {} does not match row count {}",
            outcomes.len(),
            row_ids.len()
        )));
    }

    let mut data = Vec::with_capacity(row_ids.len());
    for (row_id, outcome) in row_ids.into_iter().zip(outcomes) {
        let serialized = match outcome.vector() {
            Some(vector) => serde_json::to_string(vector)?,
            None => "[]".to_string(),
        };
        data.push((row_id, serialized));
    }

    tracing::info!(
        rows = data.len(),
        workers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "embedding request complete"
    );

    Ok(Json(EmbeddingResponse { data }))
}
