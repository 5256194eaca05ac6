use thiserror::Error;

/// Errors raised while planning a request's batches.
///
/// These are configuration faults, not data faults: malformed rows degrade
/// to per-row outcomes downstream and never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A batch size of zero can never cover the input.
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_bad_value() {
        let err = PipelineError::InvalidBatchSize(0);
        assert!(err.to_string().contains("batch size"));
        assert!(err.to_string().contains('0'));
    }
}
