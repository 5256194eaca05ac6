//! Failure isolation tests: a dead backend or a bad model name costs its
//! own rows and nothing else.

use embedrelay::{
    embed_rows, plan_batches, EmbedderSet, EmbeddingConfig, LocalConfig, PipelineError,
    RemoteConfig, RowCell, RowOutcome,
};

/// Stub local backend plus a remote backend aimed at a closed local port,
/// so remote batches fail fast with a connection refusal.
fn failing_remote_set() -> EmbedderSet {
    let cfg = EmbeddingConfig {
        remote: RemoteConfig {
            api_url: "http://127.0.0.1:9/v1/embeddings".into(),
            connect_timeout_secs: 1,
            timeout_secs: 2,
            ..RemoteConfig::default()
        },
        local: LocalConfig {
            mode: "stub".into(),
            ..LocalConfig::default()
        },
    };
    EmbedderSet::new(&cfg).expect("embedders should construct")
}

#[tokio::test]
async fn zero_batch_size_is_a_configuration_error() {
    let rows = vec![RowCell::new("text", "hf_embedding")];
    assert_eq!(
        plan_batches(&rows, 0),
        Err(PipelineError::InvalidBatchSize(0))
    );
}

#[tokio::test]
async fn remote_failure_drops_only_the_remote_rows() {
    let set = failing_remote_set();
    let rows = vec![
        RowCell::new("local one", "hf_embedding"),
        RowCell::new("remote one", "openai_embedding"),
        RowCell::new("remote two", "openai_embedding"),
        RowCell::new("local two", "hf_embedding"),
    ];

    let outcomes = embed_rows(&rows, &set, 1024, 4).await.unwrap();

    assert!(matches!(outcomes[0], RowOutcome::Embedded(_)));
    assert_eq!(outcomes[1], RowOutcome::Failed);
    assert_eq!(outcomes[2], RowOutcome::Failed);
    assert!(matches!(outcomes[3], RowOutcome::Embedded(_)));
}

#[tokio::test]
async fn concurrent_remote_failures_do_not_block_local_batches() {
    let set = failing_remote_set();
    // Alternate models so every other batch hits the dead endpoint.
    let rows: Vec<RowCell> = (0..10)
        .map(|i| {
            let model = if i % 2 == 0 {
                "openai_embedding"
            } else {
                "hf_embedding"
            };
            RowCell::new(format!("row {i}"), model)
        })
        .collect();

    let outcomes = embed_rows(&rows, &set, 1024, 8).await.unwrap();

    assert_eq!(outcomes.len(), 10);
    for (i, outcome) in outcomes.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(*outcome, RowOutcome::Failed, "remote row {i}");
        } else {
            assert!(
                matches!(outcome, RowOutcome::Embedded(_)),
                "local row {i} should survive"
            );
        }
    }
}

#[tokio::test]
async fn invalid_model_rows_fail_without_raising() {
    let set = failing_remote_set();
    let rows = vec![
        RowCell::new("text", "bogus"),
        RowCell::new("", "bogus"),
        RowCell::new("good", "hf_embedding"),
    ];

    let outcomes = embed_rows(&rows, &set, 1024, 4).await.unwrap();

    assert_eq!(outcomes[0], RowOutcome::Failed);
    // Blank rows stay filtered even inside an invalid-model batch.
    assert_eq!(outcomes[1], RowOutcome::Filtered);
    assert!(matches!(outcomes[2], RowOutcome::Embedded(_)));
}

#[tokio::test]
async fn whole_request_of_failures_still_answers_per_row() {
    let set = failing_remote_set();
    let rows: Vec<RowCell> = (0..5)
        .map(|i| RowCell::new(format!("doomed {i}"), "openai_embedding"))
        .collect();

    let outcomes = embed_rows(&rows, &set, 2, 4).await.unwrap();

    assert_eq!(outcomes.len(), 5);
    assert!(outcomes.iter().all(|o| *o == RowOutcome::Failed));
}
