use embedding::{EmbedderSet, RowOutcome};
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::partition::Batch;

/// Worker-pool size for a request: one worker per full batch, at least one,
/// clamped by the configured ceiling. Zero input items land on the floor of
/// one rather than an empty pool.
pub fn worker_count(total_items: usize, batch_size: usize, max_workers: usize) -> usize {
    (total_items / batch_size.max(1)).clamp(1, max_workers.max(1))
}

/// Run every batch against the router with bounded concurrency and return
/// the flattened per-row outcomes in submission order.
///
/// Batches execute independently; the router converts backend failures to
/// `Failed` outcomes, so one batch can never cancel or corrupt a sibling.
/// Results are collected by submission index, not completion order, and the
/// call blocks until the last batch finishes. Each batch contributes exactly
/// as many outcomes as it has rows, so the flattened length always equals
/// the total input length.
pub async fn dispatch_batches(
    batches: Vec<Batch>,
    embedders: &EmbedderSet,
    workers: usize,
) -> Vec<RowOutcome> {
    let total_batches = batches.len();
    let mut tagged: Vec<(usize, Vec<RowOutcome>)> =
        stream::iter(batches.into_iter().enumerate().map(|(idx, batch)| async move {
            let outcomes = embedders.embed_batch(&batch.model_name, &batch.texts).await;
            (idx, outcomes)
        }))
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    // Completion order is arbitrary under buffer_unordered; re-sort by
    // submission index before flattening.
    tagged.sort_by_key(|(idx, _)| *idx);

    debug!(batches = total_batches, workers, "dispatched all batches");
    tagged.into_iter().flat_map(|(_, outcomes)| outcomes).collect()
}
