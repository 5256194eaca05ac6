use thiserror::Error;

/// Errors surfaced while constructing or invoking an embedding backend.
///
/// The router never lets these escape a request: they are logged and the
/// affected rows degrade to empty results. They do surface from backend
/// construction at startup, where failing fast is the right call.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Configuration is inconsistent (unknown mode, unbuildable client).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),

    /// Remote embedding API failure: transport, status, or response shape.
    #[error("remote api failure: {0}")]
    Api(String),

    /// Tokenization, ONNX runtime, or pooling failure.
    #[error("inference failure: {0}")]
    Inference(String),
}
