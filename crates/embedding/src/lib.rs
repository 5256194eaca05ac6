//! Embedding backends for the embedrelay dispatch service.
//!
//! This crate turns batches of text into dense vectors. Callers declare a
//! model name per batch and the router sends the batch to the matching
//! backend:
//!
//! - **`openai_embedding`** - One HTTP call per batch against an
//!   OpenAI-compatible embeddings endpoint.
//! - **`hf_embedding`** - A locally loaded transformer, one item at a time,
//!   mean-pooled and L2-normalized.
//!
//! The nice thing is the failure shape: nothing a backend does can escape a
//! request. A dead endpoint, a bogus model name, a text the tokenizer chokes
//! on - all of it degrades to per-row `Failed` outcomes while the rest of
//! the request proceeds. The router returns exactly one [`RowOutcome`] per
//! input cell, so callers can zip results against row ids without counting.
//!
//! If the local model files are missing we fall back to a deterministic stub
//! embedder instead of refusing to boot. Saved our bacon more than once when
//! deploying to hosts that never got the model download step.
//!
//! ## Threading notes
//!
//! Tokenizers and ONNX sessions get cached per-thread. First call on any
//! thread does the expensive setup; after that it's fast. The remote path
//! shares one pooled HTTP client.
//!
//! ## Quick example
//!
//! ```no_run
//! use embedding::{EmbedderSet, EmbeddingConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let set = EmbedderSet::new(&EmbeddingConfig::default()).unwrap();
//!     let cells = vec![Some("hello world".to_string()), None];
//!     let outcomes = set.embed_batch("hf_embedding", &cells).await;
//!     assert_eq!(outcomes.len(), cells.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

mod cache;
mod local;
mod normalize;
mod remote;
mod stub;

pub use crate::config::{EmbeddingConfig, LocalConfig, RemoteConfig};
pub use crate::error::EmbeddingError;
pub use crate::local::LocalBackend;
pub use crate::remote::RemoteBackend;
pub use crate::types::{ModelKind, RowOutcome};

use tracing::warn;

/// Both backends plus the routing logic between them.
///
/// Constructed once at startup and shared across requests; backends hold
/// their own handles (HTTP client, model cache) and are safe to call from
/// concurrent batch tasks.
pub struct EmbedderSet {
    remote: RemoteBackend,
    local: LocalBackend,
}

impl EmbedderSet {
    pub fn new(cfg: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        Ok(Self {
            remote: RemoteBackend::new(&cfg.remote)?,
            local: LocalBackend::new(&cfg.local)?,
        })
    }

    /// Effective local-backend mode (`"onnx"` or `"stub"`).
    pub fn local_mode(&self) -> &'static str {
        self.local.mode_name()
    }

    /// Whether the remote backend carries a credential.
    pub fn remote_has_credential(&self) -> bool {
        self.remote.has_credential()
    }

    /// Route one batch to the backend its model name selects.
    ///
    /// `cells` holds one entry per row: `None` for rows whose wire value was
    /// not a string, `Some(text)` otherwise. Blank-after-trim and `None`
    /// cells are filtered before any backend sees the batch. The returned
    /// vector always has `cells.len()` entries in input order.
    pub async fn embed_batch(&self, model_name: &str, cells: &[Option<String>]) -> Vec<RowOutcome> {
        let mut outcomes = vec![RowOutcome::Filtered; cells.len()];

        let mut live_idx = Vec::new();
        let mut texts = Vec::new();
        for (idx, cell) in cells.iter().enumerate() {
            if let Some(text) = cell {
                if !text.trim().is_empty() {
                    live_idx.push(idx);
                    texts.push(text.clone());
                }
            }
        }
        if texts.is_empty() {
            return outcomes;
        }

        match ModelKind::parse(model_name) {
            None => {
                warn!(model = model_name, rows = live_idx.len(), "invalid model name, dropping batch");
                for idx in live_idx {
                    outcomes[idx] = RowOutcome::Failed;
                }
            }
            Some(ModelKind::RemoteApi) => match self.remote.embed(&texts).await {
                Ok(vectors) => {
                    for (idx, vector) in live_idx.into_iter().zip(vectors) {
                        outcomes[idx] = RowOutcome::Embedded(vector);
                    }
                }
                Err(err) => {
                    warn!(error = %err, rows = live_idx.len(), "remote batch failed");
                    for idx in live_idx {
                        outcomes[idx] = RowOutcome::Failed;
                    }
                }
            },
            Some(ModelKind::LocalInference) => {
                let local = self.local.clone();
                match tokio::task::spawn_blocking(move || local.embed_each(&texts)).await {
                    Ok(results) => {
                        for (idx, result) in live_idx.into_iter().zip(results) {
                            outcomes[idx] = match result {
                                Ok(vector) => RowOutcome::Embedded(vector),
                                Err(err) => {
                                    warn!(error = %err, "local inference failed for one item");
                                    RowOutcome::Failed
                                }
                            };
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "local inference task panicked");
                        for idx in live_idx {
                            outcomes[idx] = RowOutcome::Failed;
                        }
                    }
                }
            }
        }

        outcomes
    }
}
