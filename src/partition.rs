use crate::PipelineError;

/// One deinterleaved input row: the text cell (already reduced to
/// `Some(text)` / `None` for non-string wire values) and the model name the
/// caller declared for it. Row ids stay with the caller; batching never
/// needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCell {
    pub text: Option<String>,
    pub model_name: String,
}

impl RowCell {
    pub fn new(text: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            model_name: model_name.into(),
        }
    }
}

/// A contiguous slice of input rows sharing one model name, ready for
/// dispatch. `start` is the batch's offset into the original row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub start: usize,
    pub model_name: String,
    pub texts: Vec<Option<String>>,
}

/// Split rows into batches of at most `batch_size`, never mixing model
/// names inside one batch.
///
/// Rows are first grouped into contiguous runs of equal model name, then
/// each run is chunked. Original order is preserved throughout and every
/// row lands in exactly one batch; the last chunk of a run may be shorter.
/// No filtering happens here - blank rows travel with their batch so the
/// per-row outcome count stays total.
pub fn plan_batches(rows: &[RowCell], batch_size: usize) -> Result<Vec<Batch>, PipelineError> {
    if batch_size == 0 {
        return Err(PipelineError::InvalidBatchSize(batch_size));
    }

    let mut batches = Vec::new();
    let mut run_start = 0usize;

    while run_start < rows.len() {
        let model_name = &rows[run_start].model_name;
        let mut run_end = run_start + 1;
        while run_end < rows.len() && rows[run_end].model_name == *model_name {
            run_end += 1;
        }

        let mut chunk_start = run_start;
        while chunk_start < run_end {
            let chunk_end = (chunk_start + batch_size).min(run_end);
            batches.push(Batch {
                start: chunk_start,
                model_name: model_name.clone(),
                texts: rows[chunk_start..chunk_end]
                    .iter()
                    .map(|row| row.text.clone())
                    .collect(),
            });
            chunk_start = chunk_end;
        }

        run_start = run_end;
    }

    Ok(batches)
}
