//! End-to-end pipeline tests: plan, dispatch, and reassemble with the
//! deterministic stub backend.

use embedrelay::{embed_rows, EmbedderSet, EmbeddingConfig, LocalConfig, RowCell, RowOutcome};

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

#[tokio::test]
async fn every_row_gets_exactly_one_outcome() {
    let set = stub_set();
    let rows: Vec<RowCell> = (0..25)
        .map(|i| RowCell::new(format!("document {i}"), "hf_embedding"))
        .collect();

    let outcomes = embed_rows(&rows, &set, 4, 8).await.expect("pipeline runs");

    assert_eq!(outcomes.len(), rows.len());
    assert!(outcomes.iter().all(|o| matches!(o, RowOutcome::Embedded(_))));
}

#[tokio::test]
async fn output_order_matches_input_order() {
    let set = stub_set();
    let rows: Vec<RowCell> = (0..12)
        .map(|i| RowCell::new(format!("row {i}"), "hf_embedding"))
        .collect();

    // Small batches force several concurrent workers; order must still hold.
    let outcomes = embed_rows(&rows, &set, 2, 6).await.unwrap();

    for (i, outcome) in outcomes.iter().enumerate() {
        let expected = set
            .embed_batch("hf_embedding", &[Some(format!("row {i}"))])
            .await;
        assert_eq!(*outcome, expected[0], "row {i} shifted position");
    }
}

#[tokio::test]
async fn model_runs_are_batched_separately() {
    let set = stub_set();
    // The hf run and the bogus run share no batch, so the bogus rows fail
    // without dragging the hf rows down.
    let rows = vec![
        RowCell::new("first", "hf_embedding"),
        RowCell::new("second", "hf_embedding"),
        RowCell::new("third", "totally_bogus"),
        RowCell::new("fourth", "hf_embedding"),
    ];

    let outcomes = embed_rows(&rows, &set, 1024, 4).await.unwrap();

    assert!(matches!(outcomes[0], RowOutcome::Embedded(_)));
    assert!(matches!(outcomes[1], RowOutcome::Embedded(_)));
    assert_eq!(outcomes[2], RowOutcome::Failed);
    assert!(matches!(outcomes[3], RowOutcome::Embedded(_)));
}

#[tokio::test]
async fn filtered_rows_keep_their_position() {
    let set = stub_set();
    let rows = vec![
        RowCell::new("real", "hf_embedding"),
        RowCell::new("", "hf_embedding"),
        RowCell::new("   ", "hf_embedding"),
        RowCell {
            text: None,
            model_name: "hf_embedding".into(),
        },
        RowCell::new("also real", "hf_embedding"),
    ];

    let outcomes = embed_rows(&rows, &set, 2, 4).await.unwrap();

    assert!(matches!(outcomes[0], RowOutcome::Embedded(_)));
    assert_eq!(outcomes[1], RowOutcome::Filtered);
    assert_eq!(outcomes[2], RowOutcome::Filtered);
    assert_eq!(outcomes[3], RowOutcome::Filtered);
    assert!(matches!(outcomes[4], RowOutcome::Embedded(_)));
}

#[tokio::test]
async fn local_vectors_are_unit_length() {
    let set = stub_set();
    let rows = vec![
        RowCell::new("normalize me", "hf_embedding"),
        RowCell::new("and me", "hf_embedding"),
    ];

    let outcomes = embed_rows(&rows, &set, 1024, 4).await.unwrap();

    for outcome in &outcomes {
        let vector = outcome.vector().expect("stub rows embed");
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }
}
