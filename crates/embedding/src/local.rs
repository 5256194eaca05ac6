use onnxruntime::ndarray::{Array, Array2};
use tracing::warn;

use crate::cache::{get_or_load_model_handle, CachedModel};
use crate::config::LocalConfig;
use crate::normalize::l2_normalize_in_place;
use crate::stub::stub_embedding;
use crate::EmbeddingError;

/// The `hf_embedding` backend: a locally loaded transformer.
///
/// Texts run through the model one at a time; each item tokenizes, runs the
/// ONNX session, mean-pools the last hidden state across unmasked tokens,
/// and L2-normalizes. Failures are isolated per item, so one bad input never
/// takes its siblings down with it.
///
/// When the model or tokenizer file is missing at startup the backend
/// degrades to a deterministic stub instead of refusing to boot. The stub is
/// also available explicitly via `mode = "stub"`, which is what the tests
/// run on.
#[derive(Clone)]
pub struct LocalBackend {
    mode: LocalMode,
    cfg: LocalConfig,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LocalMode {
    Onnx,
    Stub,
}

impl LocalBackend {
    pub fn new(cfg: &LocalConfig) -> Result<Self, EmbeddingError> {
        let mode = match cfg.mode.as_str() {
            "stub" => LocalMode::Stub,
            "onnx" => {
                if cfg.model_path.exists() && cfg.tokenizer_path.exists() {
                    LocalMode::Onnx
                } else {
                    warn!(
                        model = %cfg.model_path.display(),
                        tokenizer = %cfg.tokenizer_path.display(),
                        "local model assets missing, serving stub embeddings"
                    );
                    LocalMode::Stub
                }
            }
            other => {
                return Err(EmbeddingError::InvalidConfig(format!(
                    "unknown local mode `{other}` (expected `onnx` or `stub`)"
                )))
            }
        };

        Ok(Self {
            mode,
            cfg: cfg.clone(),
        })
    }

    /// Effective mode after asset resolution, surfaced on the readiness probe.
    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            LocalMode::Onnx => "onnx",
            LocalMode::Stub => "stub",
        }
    }

    /// Embed each text independently. Returns one result per input in input
    /// order; a failing item yields its own `Err` without affecting siblings.
    ///
    /// Blocking. Callers on an async runtime should wrap this in
    /// `spawn_blocking`.
    pub fn embed_each(&self, texts: &[String]) -> Vec<Result<Vec<f32>, EmbeddingError>> {
        match self.mode {
            LocalMode::Stub => texts.iter().map(|t| Ok(stub_embedding(t))).collect(),
            LocalMode::Onnx => {
                let handle = match get_or_load_model_handle(&self.cfg) {
                    Ok(handle) => handle,
                    // Load failure hits every item in the batch equally.
                    Err(err) => {
                        let msg = err.to_string();
                        return texts
                            .iter()
                            .map(|_| Err(EmbeddingError::Inference(msg.clone())))
                            .collect();
                    }
                };

                texts
                    .iter()
                    .map(|text| {
                        embed_one(handle.as_ref(), text, self.cfg.max_sequence_length).map(
                            |mut v| {
                                l2_normalize_in_place(&mut v);
                                v
                            },
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Tokenize one text, run the session, and mean-pool the last hidden state
/// over the attention mask. Returns the raw pooled vector; normalization is
/// the caller's job.
fn embed_one(
    handle: &CachedModel,
    text: &str,
    max_sequence_length: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    let encoding = handle
        .tokenizer
        .encode(text, true)
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

    let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
    let mut mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&x| x as i64)
        .collect();
    if ids.len() != mask.len() {
        return Err(EmbeddingError::Inference(
            "tokenizer produced mismatched id/mask lengths".into(),
        ));
    }
    if ids.len() > max_sequence_length {
        ids.truncate(max_sequence_length);
        mask.truncate(max_sequence_length);
    }
    if ids.is_empty() {
        return Err(EmbeddingError::Inference(
            "tokenizer produced no tokens".into(),
        ));
    }

    let seq_len = ids.len();
    let input_ids = Array::from_shape_vec((1, seq_len), ids)
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((1, seq_len), mask.clone())
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

    let hidden_states = run_session(handle, input_ids, attn_mask)?;
    mean_pool(&hidden_states, &mask, seq_len)
}

fn run_session(
    handle: &CachedModel,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<Vec<f32>, EmbeddingError> {
    let (batch, seq_len) = input_ids.dim();
    let mut guard = handle.session.borrow_mut();
    let session_ref = &mut *guard;
    let mut runtime_inputs = Vec::with_capacity(session_ref.inputs.len());
    let mut input_ids_tensor = Some(input_ids);
    let mut attn_mask_tensor = Some(attn_mask);

    for input in &session_ref.inputs {
        match input.name.as_str() {
            "input_ids" => {
                let tensor = input_ids_tensor.take().ok_or_else(|| {
                    EmbeddingError::InvalidConfig(
                        "model requested `input_ids` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "attention_mask" => {
                let tensor = attn_mask_tensor.take().ok_or_else(|| {
                    EmbeddingError::InvalidConfig(
                        "model requested `attention_mask` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "token_type_ids" => {
                let tensor = Array::from_elem((batch, seq_len), 0_i64);
                runtime_inputs.push(tensor.into_dyn());
            }
            other => {
                return Err(EmbeddingError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
    }

    if runtime_inputs.is_empty() {
        return Err(EmbeddingError::Inference(
            "model did not declare any inputs".into(),
        ));
    }

    let outputs = session_ref
        .run::<i64, f32, _>(runtime_inputs)
        .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
    let output_tensor = outputs
        .into_iter()
        .next()
        .ok_or_else(|| EmbeddingError::Inference("model returned no outputs".into()))?;

    Ok(output_tensor.iter().copied().collect())
}

/// Average the per-token hidden vectors, counting only positions the
/// attention mask marks live. Expects a flattened `[1, seq_len, hidden]`
/// last-hidden-state tensor.
fn mean_pool(flat: &[f32], mask: &[i64], seq_len: usize) -> Result<Vec<f32>, EmbeddingError> {
    if flat.is_empty() || !flat.len().is_multiple_of(seq_len) {
        return Err(EmbeddingError::Inference(format!(
            "model output length {} is not divisible by sequence length {}",
            flat.len(),
            seq_len
        )));
    }

    let hidden = flat.len() / seq_len;
    let mut pooled = vec![0.0f32; hidden];
    let mut live = 0usize;

    for (token_idx, token_vec) in flat.chunks(hidden).enumerate() {
        if mask.get(token_idx).copied().unwrap_or(0) == 0 {
            continue;
        }
        live += 1;
        for (acc, &val) in pooled.iter_mut().zip(token_vec) {
            *acc += val;
        }
    }

    if live == 0 {
        return Err(EmbeddingError::Inference(
            "attention mask has no live tokens".into(),
        ));
    }

    let inv = (live as f32).recip();
    for val in &mut pooled {
        *val *= inv;
    }
    Ok(pooled)
}
