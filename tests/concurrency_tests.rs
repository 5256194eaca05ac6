//! Concurrency tests for batch dispatch: bounded fan-out, submission-order
//! collection, and safe sharing of the embedder handles across tasks.

use std::sync::Arc;

use embedrelay::{
    dispatch_batches, embed_rows, plan_batches, worker_count, EmbedderSet, EmbeddingConfig,
    LocalConfig, RowCell, RowOutcome,
};

fn stub_set() -> EmbedderSet {
    let cfg = EmbeddingConfig {
        local: LocalConfig {
            mode: "stub".into(),
            ..LocalConfig::default()
        },
        ..EmbeddingConfig::default()
    };
    EmbedderSet::new(&cfg).expect("stub embedders should construct")
}

#[test]
fn worker_count_formula() {
    // One worker per full batch, floored at one.
    assert_eq!(worker_count(0, 1024, 16), 1);
    assert_eq!(worker_count(1, 1024, 16), 1);
    assert_eq!(worker_count(1023, 1024, 16), 1);
    assert_eq!(worker_count(2048, 1024, 16), 2);
    assert_eq!(worker_count(5000, 1024, 16), 4);
    // Capped by the configured ceiling.
    assert_eq!(worker_count(1024 * 100, 1024, 16), 16);
}

#[tokio::test]
async fn many_small_batches_come_back_in_submission_order() {
    let set = stub_set();
    let rows: Vec<RowCell> = (0..64)
        .map(|i| RowCell::new(format!("payload {i}"), "hf_embedding"))
        .collect();
    let batches = plan_batches(&rows, 1).unwrap();
    assert_eq!(batches.len(), 64);

    let outcomes = dispatch_batches(batches, &set, 16).await;

    assert_eq!(outcomes.len(), 64);
    for (i, outcome) in outcomes.iter().enumerate() {
        let expected = set
            .embed_batch("hf_embedding", &[Some(format!("payload {i}"))])
            .await;
        assert_eq!(*outcome, expected[0], "batch {i} landed out of order");
    }
}

#[tokio::test]
async fn single_worker_still_drains_every_batch() {
    let set = stub_set();
    let rows: Vec<RowCell> = (0..10)
        .map(|i| RowCell::new(format!("serial {i}"), "hf_embedding"))
        .collect();
    let batches = plan_batches(&rows, 3).unwrap();

    let outcomes = dispatch_batches(batches, &set, 1).await;

    assert_eq!(outcomes.len(), 10);
    assert!(outcomes.iter().all(|o| matches!(o, RowOutcome::Embedded(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_embedder_set() {
    let set = Arc::new(stub_set());

    let handles: Vec<_> = (0..8)
        .map(|req| {
            let set = Arc::clone(&set);
            tokio::spawn(async move {
                let rows: Vec<RowCell> = (0..6)
                    .map(|i| RowCell::new(format!("request {req} row {i}"), "hf_embedding"))
                    .collect();
                embed_rows(&rows, &set, 2, 4).await.expect("pipeline runs")
            })
        })
        .collect();

    for (req, handle) in handles.into_iter().enumerate() {
        let outcomes = handle.await.expect("task completes");
        assert_eq!(outcomes.len(), 6, "request {req} lost rows");
        assert!(outcomes.iter().all(|o| matches!(o, RowOutcome::Embedded(_))));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_does_not_change_results() {
    let set = stub_set();
    let rows: Vec<RowCell> = (0..20)
        .map(|i| RowCell::new(format!("stable {i}"), "hf_embedding"))
        .collect();

    let wide = embed_rows(&rows, &set, 1, 16).await.unwrap();
    let narrow = embed_rows(&rows, &set, 1, 1).await.unwrap();

    assert_eq!(wide, narrow);
}
