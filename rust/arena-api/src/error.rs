//! Error types for the debate engine and its HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Result type alias using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error taxonomy.
///
/// `Pipeline` and `Judge` failures are recovered inside the engine (the
/// round still completes with a fallback response or a sentinel ruling)
/// and only exist so internal helpers can report what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed or missing input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown session id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Operation not legal in the session's current phase or turn.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Response pipeline failure (recovered internally).
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Judge failure (recovered internally).
    #[error("judge error: {0}")]
    Judge(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Pipeline(_) | Self::Judge(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            EngineError::Validation("empty".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EngineError::SessionNotFound("abc".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            EngineError::InvalidState("ended".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            EngineError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = EngineError::InvalidState("not your turn".into());
        assert_eq!(err.to_string(), "invalid state: not your turn");
    }
}
