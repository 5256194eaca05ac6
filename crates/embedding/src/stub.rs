use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;

/// Output dimension of the stub embedder. Matches the MiniLM family so a
/// stub deployment produces vectors the same width as the real model.
pub(crate) const STUB_DIM: usize = 384;

/// Deterministic stand-in used when the local model assets are unavailable
/// or `mode = "stub"` is configured. Generates sinusoid values derived from
/// a hash of the input text to guarantee reproducible vectors with minimal
/// CPU cost. Always unit length, like the real local path.
pub(crate) fn stub_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0f32; STUB_DIM];
    let h = hash64(text.as_bytes());
    for (idx, value) in v.iter_mut().enumerate() {
        *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
    }
    l2_normalize_in_place(&mut v);
    v
}
