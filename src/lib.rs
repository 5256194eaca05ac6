//! Workspace umbrella crate for the embedrelay dispatch service.
//!
//! This crate stitches batch planning and concurrent dispatch together so
//! callers can turn a deinterleaved list of rows into per-row embedding
//! outcomes with a single API entry point. The HTTP surface lives in
//! `crates/server`; the backends themselves live in `crates/embedding`.

pub use embedding::{
    EmbedderSet, EmbeddingConfig, EmbeddingError, LocalConfig, ModelKind, RemoteConfig,
    RowOutcome,
};

mod error;

pub mod dispatch;
pub mod partition;

pub use crate::dispatch::{dispatch_batches, worker_count};
pub use crate::error::PipelineError;
pub use crate::partition::{plan_batches, Batch, RowCell};

/// Plan and dispatch one request's rows end to end.
///
/// Rows are grouped into single-model batches of at most `batch_size`,
/// fanned out across `max(1, rows / batch_size)` workers (capped at
/// `max_workers`), and collected back in input order. The result always
/// holds exactly one outcome per input row.
pub async fn embed_rows(
    rows: &[RowCell],
    embedders: &EmbedderSet,
    batch_size: usize,
    max_workers: usize,
) -> Result<Vec<RowOutcome>, PipelineError> {
    let batches = plan_batches(rows, batch_size)?;
    let workers = worker_count(rows.len(), batch_size, max_workers);
    Ok(dispatch_batches(batches, embedders, workers).await)
}
