use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Backend failures never show up here for well-formed requests: the router
/// converts them to per-row empty results and the endpoint answers 200.
/// These variants cover the boundary itself - auth, limits, malformed
/// payloads, and startup faults.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error("Embedding error: {0}")]
    Embedding(#[from] embedding::EmbeddingError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] embedrelay::PipelineError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Embedding(_) | ServerError::Pipeline(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Embedding(_) => "EMBEDDING_ERROR",
            ServerError::Pipeline(_) => "PIPELINE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        assert_eq!(
            ServerError::Authentication("no key".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(ServerError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServerError::Config("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
