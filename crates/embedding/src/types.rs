/// Recognized wire model identifiers.
///
/// These are the literal strings callers put in the third column of each
/// row; anything else routes nowhere and drops the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// `"openai_embedding"`: the whole batch goes out as one API call.
    RemoteApi,
    /// `"hf_embedding"`: items run through the local model one at a time.
    LocalInference,
}

impl ModelKind {
    /// Map a wire model name onto a backend; `None` means invalid.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "openai_embedding" => Some(ModelKind::RemoteApi),
            "hf_embedding" => Some(ModelKind::LocalInference),
            _ => None,
        }
    }
}

/// Per-row result of the embedding pipeline.
///
/// The router returns exactly one outcome per input cell, which keeps the
/// final row-id zip total: a row can be skipped or fail, but it can never
/// disappear or shift position.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// A backend produced a vector for this row.
    Embedded(Vec<f32>),
    /// Blank or non-string input; never sent to a backend.
    Filtered,
    /// The row's batch failed, the model name was invalid, or the item
    /// itself failed local inference.
    Failed,
}

impl RowOutcome {
    /// The embedded vector, if any.
    pub fn vector(&self) -> Option<&[f32]> {
        match self {
            RowOutcome::Embedded(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_route_as_documented() {
        assert_eq!(ModelKind::parse("openai_embedding"), Some(ModelKind::RemoteApi));
        assert_eq!(ModelKind::parse("hf_embedding"), Some(ModelKind::LocalInference));
        assert_eq!(ModelKind::parse("bogus"), None);
        assert_eq!(ModelKind::parse(""), None);
        // Matching is exact, not case-insensitive.
        assert_eq!(ModelKind::parse("OpenAI_Embedding"), None);
    }

    #[test]
    fn vector_accessor() {
        assert_eq!(
            RowOutcome::Embedded(vec![1.0, 2.0]).vector(),
            Some([1.0f32, 2.0].as_slice())
        );
        assert_eq!(RowOutcome::Filtered.vector(), None);
        assert_eq!(RowOutcome::Failed.vector(), None);
    }
}
